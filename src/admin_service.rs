use tracing::warn;

use crate::errors::ServiceError;
use crate::generation_client::GenerationClient;
use crate::prompts;

// Import logging macros
use crate::log_service_start;

/// Content authoring helpers for administrators: passages, titles and
/// sample answers.
#[derive(Clone)]
pub struct AdminService {
    client: Option<GenerationClient>,
}

impl AdminService {
    pub fn new(client: Option<GenerationClient>) -> Self {
        Self { client }
    }

    fn client(&self) -> Result<&GenerationClient, ServiceError> {
        self.client
            .as_ref()
            .ok_or_else(|| ServiceError::GenerationUnavailable("no API keys configured".to_string()))
    }

    /// Reading passage for a title, or a canned sample when generation is unavailable.
    pub async fn generate_reading_passage(&self, title: &str) -> String {
        log_service_start!("admin_service", "generate_reading_passage");

        let generated = match self.client() {
            Ok(client) => client
                .generate_tagged("reading_passage", &prompts::reading_passage(title))
                .await
                .map_err(ServiceError::from),
            Err(e) => Err(e),
        };

        match generated {
            Ok(passage) => passage,
            Err(e) => {
                warn!(service = "admin_service", error = %e, "Using sample reading passage");
                sample_passage(title)
            }
        }
    }

    /// First non-empty line of the generated title.
    pub async fn generate_writing_title(&self, band: &str) -> Result<String, ServiceError> {
        log_service_start!("admin_service", "generate_writing_title");

        let raw = self
            .client()?
            .generate_tagged("writing_title", &prompts::writing_title(band))
            .await?;

        Ok(first_line(&raw))
    }

    pub async fn generate_writing_suggestions(&self, topic: &str) -> Result<String, ServiceError> {
        log_service_start!("admin_service", "generate_writing_suggestions");

        let raw = self
            .client()?
            .generate_tagged("writing_suggestions", &prompts::writing_suggestions(topic))
            .await?;

        Ok(raw)
    }
}

fn first_line(raw: &str) -> String {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub fn sample_passage(title: &str) -> String {
    format!(
        "Passage: This is a sample IELTS reading passage about {}. The passage discusses various aspects of the topic including historical background, current trends, and future implications. It provides comprehensive information suitable for IELTS reading comprehension tests. The content is structured to test students' ability to understand main ideas, supporting details, and inference skills. This passage serves as an excellent practice material for IELTS candidates preparing for their reading test.",
        title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n  The Future of Work \nextra"), "The Future of Work");
        assert_eq!(first_line(""), "");
    }

    #[tokio::test]
    async fn test_without_client() {
        let service = AdminService::new(None);

        let passage = service.generate_reading_passage("Coral Reefs").await;
        assert!(passage.starts_with("Passage: This is a sample IELTS reading passage about Coral Reefs."));

        let title = service.generate_writing_title("7").await;
        assert!(matches!(title, Err(ServiceError::GenerationUnavailable(_))));
    }
}
