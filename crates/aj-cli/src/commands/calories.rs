//! Calories command: asks the configured provider for one day's active energy.

use std::io::Write;

use aj_health::CalorieProvider;
use anyhow::Result;

/// Provider failures are reported as a notice; they never fail the command.
pub async fn run<W: Write>(
    writer: &mut W,
    provider: &(dyn CalorieProvider + Send + Sync),
    date: &str,
) -> Result<()> {
    match provider.get_calories(date).await {
        Ok(calories) => {
            writeln!(
                writer,
                "{}: {:.1} kcal active ({})",
                calories.date, calories.calories_kcal, calories.source_id
            )?;
        }
        Err(err) => {
            tracing::debug!(source = provider.source_id(), error = %err, "calorie lookup failed");
            writeln!(writer, "Calories unavailable for {date}: {err}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use aj_health::{DailyCalories, ProviderError, UnavailableProvider};
    use async_trait::async_trait;

    struct FixedProvider;

    #[async_trait]
    impl CalorieProvider for FixedProvider {
        async fn get_calories(&self, date: &str) -> Result<DailyCalories, ProviderError> {
            Ok(DailyCalories {
                date: date.to_string(),
                calories_kcal: 412.34,
                source_id: "fixed",
                fetched_at: 1_704_500_000_000,
            })
        }

        fn source_id(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn prints_calories_from_provider() {
        let mut output = Vec::new();
        run(&mut output, &FixedProvider, "2024-01-06").await.unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "2024-01-06: 412.3 kcal active (fixed)\n"
        );
    }

    #[tokio::test]
    async fn provider_failure_is_a_notice() {
        let mut output = Vec::new();
        run(&mut output, &UnavailableProvider, "2024-01-06")
            .await
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Calories unavailable for 2024-01-06: calorie provider unavailable"));
    }
}
