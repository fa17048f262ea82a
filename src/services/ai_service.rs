use crate::dto::insight_dto::WeatherStatistics;
use crate::error::Result;
use crate::models::weather_log::WeatherLog;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

const HISTORY_POINTS: usize = 12;

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl AIService {
    pub fn new(api_url: String, api_key: Option<String>, model: String, client: Client) -> Self {
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Narrative forecast for a set of readings. `None` when disabled or when
    /// the upstream call fails.
    pub async fn narrate_weather(
        &self,
        stats: &WeatherStatistics,
        logs: &[WeatherLog],
    ) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let system_prompt = "You are an experienced meteorologist who analyses weather data \
            and makes practical short-term forecasts.";
        let prompt = build_weather_prompt(stats, logs);

        match self.chat(system_prompt, &prompt).await {
            Ok(text) => {
                tracing::info!(records = logs.len(), "AI weather narrative generated");
                Some(text)
            }
            Err(e) => {
                tracing::error!(error = ?e, "AI weather narrative failed");
                None
            }
        }
    }

    pub async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(anyhow::anyhow!("AI provider is not configured").into());
        };

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "max_tokens": 800,
            "temperature": 0.7,
            "top_p": 0.9,
            "stream": false
        });

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("AI provider error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Invalid AI provider response format").into())
    }
}

fn join_series<F>(logs: &[WeatherLog], pick: F) -> String
where
    F: Fn(&WeatherLog) -> f64,
{
    // logs arrive newest first; the prompt reads oldest to newest
    let mut values: Vec<String> = logs
        .iter()
        .take(HISTORY_POINTS)
        .map(|l| format!("{:.1}", pick(l)))
        .collect();
    values.reverse();
    values.join(", ")
}

pub fn build_weather_prompt(stats: &WeatherStatistics, logs: &[WeatherLog]) -> String {
    let trend = if stats.temperature.trend > 0.0 {
        "warming"
    } else {
        "cooling"
    };

    format!(
        "WEATHER DATA ({records} readings)

CURRENT STATISTICS:
- Temperature: {t_cur:.1}°C (avg {t_avg:.1}°C, range {t_min:.1}°C to {t_max:.1}°C, {trend} {t_trend:+.1}°C)
- Humidity: {h_cur:.0}% (avg {h_avg:.0}%, range {h_min:.0}% to {h_max:.0}%)
- Wind: {w_cur:.1} km/h (avg {w_avg:.1} km/h, max {w_max:.1} km/h)
- Precipitation: {p_total:.1} mm accumulated

RECENT HISTORY (oldest to newest):
- Temperatures: [{temps}] °C
- Humidity: [{hums}] %
- Wind: [{winds}] km/h

Provide:
1. An analysis of the current conditions (2-3 sentences).
2. A forecast for the next 6 hours (3-4 sentences).
3. Practical recommendations (2-3 sentences).

Answer objectively, in at most 3 short paragraphs.",
        records = stats.period.records,
        t_cur = stats.temperature.current,
        t_avg = stats.temperature.avg,
        t_min = stats.temperature.min,
        t_max = stats.temperature.max,
        t_trend = stats.temperature.trend,
        trend = trend,
        h_cur = stats.humidity.current,
        h_avg = stats.humidity.avg,
        h_min = stats.humidity.min,
        h_max = stats.humidity.max,
        w_cur = stats.wind_speed.current,
        w_avg = stats.wind_speed.avg,
        w_max = stats.wind_speed.max,
        p_total = stats.precipitation.total,
        temps = join_series(logs, |l| l.temperature),
        hums = join_series(logs, |l| l.humidity),
        winds = join_series(logs, |l| l.wind_speed),
    )
}
