//! HTML rendering of the dashboard page
//!
//! The page is a single embedded Tera template rendered from a [`Session`].
//! The fetch report is carried in a hidden form field so questions can be
//! asked about the fetched cities without looking them up again.

use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::dashboard::{CityOutcome, InsightOutcome, Session};
use crate::models::WeatherObservation;
use crate::weather::LookupError;

const DASHBOARD_TEMPLATE: &str = "dashboard.html";

mod embedded {
    pub const DASHBOARD: &str = include_str!("templates/dashboard.html");
}

/// Weather card values, already formatted with units
#[derive(Debug, Serialize)]
struct CardView {
    heading: String,
    temperature: String,
    feels_like: String,
    description: String,
    humidity: String,
    wind: String,
    pressure: String,
}

impl From<&WeatherObservation> for CardView {
    fn from(observation: &WeatherObservation) -> Self {
        Self {
            heading: observation.display_name(),
            temperature: observation.format_temperature(),
            feels_like: observation.format_feels_like(),
            description: observation.description().to_string(),
            humidity: observation.format_humidity(),
            wind: observation.format_wind(),
            pressure: observation.format_pressure(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureView {
    hint: &'static str,
    detail: String,
}

impl From<&LookupError> for FailureView {
    fn from(error: &LookupError) -> Self {
        Self {
            hint: error.hint(),
            detail: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OutcomeView<'a> {
    query: &'a str,
    card: Option<CardView>,
    failure: Option<FailureView>,
}

impl<'a> From<&'a CityOutcome> for OutcomeView<'a> {
    fn from(outcome: &'a CityOutcome) -> Self {
        match outcome {
            CityOutcome::Fetched { query, observation } => Self {
                query,
                card: Some(CardView::from(observation)),
                failure: None,
            },
            CityOutcome::Failed { query, error } => Self {
                query,
                card: None,
                failure: Some(FailureView::from(error)),
            },
        }
    }
}

/// Template context for one page
#[derive(Debug, Serialize)]
struct DashboardView<'a> {
    cities_input: &'a str,
    notice: Option<&'a str>,
    outcomes: Vec<OutcomeView<'a>>,
    chart_svg: Option<&'a str>,
    chart_error: Option<&'a str>,
    report_json: String,
    /// Select options: fetched cities only
    cities: Vec<String>,
    selected_city: &'a str,
    question: &'a str,
    insight: Option<&'a str>,
    insight_error: Option<&'a str>,
}

impl<'a> DashboardView<'a> {
    fn new(session: &'a Session, notice: Option<&'a str>) -> crate::Result<Self> {
        let report_json = match &session.report {
            Some(report) => serde_json::to_string(report)?,
            None => String::new(),
        };
        let (selected_city, question, insight, insight_error) = match &session.insight {
            Some(InsightOutcome::Answer {
                city,
                question,
                text,
            }) => (city.as_str(), question.as_str(), Some(text.as_str()), None),
            Some(InsightOutcome::Failed { city, message }) => {
                (city.as_str(), "", None, Some(message.as_str()))
            }
            None => ("", "", None, None),
        };

        Ok(Self {
            cities_input: &session.cities_input,
            notice,
            outcomes: session
                .report
                .iter()
                .flat_map(|report| report.outcomes.iter().map(OutcomeView::from))
                .collect(),
            chart_svg: session.chart.as_ref().map(|chart| chart.svg.as_str()),
            chart_error: session.chart_error.as_deref(),
            report_json,
            cities: session
                .observations()
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            selected_city,
            question,
            insight,
            insight_error,
        })
    }
}

/// Compiled page templates
#[derive(Debug)]
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> crate::Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(DASHBOARD_TEMPLATE, embedded::DASHBOARD)?;
        Ok(Self { tera })
    }

    /// Render the full dashboard page, with an optional notice banner
    pub fn render(&self, session: &Session, notice: Option<&str>) -> crate::Result<String> {
        let view = DashboardView::new(session, notice)?;
        let context = Context::from_serialize(&view)?;
        let html = self.tera.render(DASHBOARD_TEMPLATE, &context)?;
        debug!(phase = %session.phase(), "Rendered dashboard page ({} bytes)", html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::FetchReport;
    use crate::models::observation::tests::observation;

    fn session_with(outcomes: Vec<CityOutcome>) -> Session {
        Session {
            cities_input: "Paris, Atlantis".to_string(),
            report: Some(FetchReport { outcomes }),
            ..Session::default()
        }
    }

    fn render(session: &Session, notice: Option<&str>) -> String {
        PageRenderer::new().unwrap().render(session, notice).unwrap()
    }

    #[test]
    fn test_idle_page_has_no_options() {
        let html = render(&Session::default(), None);
        assert!(html.contains("Enter Cities (comma separated):"));
        assert!(html.contains("<select id=\"city\" name=\"city\">"));
        assert!(!html.contains("<option"));
        assert!(!html.contains("Fetching weather for"));
        assert!(html.contains("Created by Dimyati"));
    }

    #[test]
    fn test_renders_cards_and_failures() {
        let session = session_with(vec![
            CityOutcome::Fetched {
                query: "Paris".to_string(),
                observation: observation("Paris", "FR", 18.0),
            },
            CityOutcome::Failed {
                query: "Atlantis".to_string(),
                error: LookupError::CityNotFound,
            },
        ]);
        let html = render(&session, None);
        assert!(html.contains("Fetching weather for Paris..."));
        assert!(html.contains("Weather in Paris, FR"));
        assert!(html.contains("<strong>Temperature</strong>: 18.0 °C"));
        assert!(html.contains("Could not retrieve data for <strong>Atlantis</strong>"));
        assert!(html.contains("<option value=\"Paris\">Paris</option>"));
        assert!(!html.contains("<option value=\"Atlantis\""));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let session = Session {
            cities_input: "<script>alert('x')</script>".to_string(),
            ..session_with(vec![CityOutcome::Failed {
                query: "<b>Atlantis</b>".to_string(),
                error: LookupError::CityNotFound,
            }])
        };
        let html = render(&session, None);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Atlantis</b>"));
        assert!(html.contains("&lt;b&gt;Atlantis&lt;"));
        assert!(html.contains("name=\"report\" value=\"{&quot;outcomes&quot;"));
    }

    #[test]
    fn test_chart_svg_is_inlined_unescaped() {
        let session = Session {
            chart: Some(crate::chart::Chart {
                statistics: crate::aggregator::summarize_temperatures(&[1.0, 2.0]),
                svg: "<svg width=\"10\"></svg>".to_string(),
            }),
            ..session_with(Vec::new())
        };
        let html = render(&session, None);
        assert!(html.contains("<svg width=\"10\"></svg>"));
    }

    #[test]
    fn test_insight_answer_and_failure() {
        let mut session = session_with(vec![CityOutcome::Fetched {
            query: "Paris".to_string(),
            observation: observation("Paris", "FR", 18.0),
        }]);
        session.insight = Some(InsightOutcome::Answer {
            city: "Paris".to_string(),
            question: "Rain?".to_string(),
            text: "No <rain>".to_string(),
        });
        let html = render(&session, None);
        assert!(html.contains("<strong>AI Insight:</strong> No &lt;rain&gt;"));
        assert!(html.contains("<option value=\"Paris\" selected>Paris</option>"));
        assert!(html.contains("name=\"question\" value=\"Rain?\""));

        session.insight = Some(InsightOutcome::Failed {
            city: "Paris".to_string(),
            message: "AI insight unavailable: quota".to_string(),
        });
        let html = render(&session, Some("heads up"));
        assert!(html.contains("AI insight unavailable: quota"));
        assert!(html.contains("<p class=\"notice\">heads up</p>"));
        assert!(!html.contains("AI Insight:"));
    }
}
