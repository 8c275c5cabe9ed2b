use color_eyre::Result;
use rand::Rng;

use crate::db::models::AccessCodeRow;
use crate::db::Db;
use crate::names;

// ---------------------------------------------------------------------------
// CodeRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait CodeRepository: Send + Sync {
    fn code_exists(&self, code: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn insert_code(
        &self,
        code: &str,
        package: &str,
    ) -> impl std::future::Future<Output = Result<AccessCodeRow>> + Send;
}

impl CodeRepository for Db {
    async fn code_exists(&self, code: &str) -> Result<bool> {
        Db::code_exists(self, code).await
    }

    async fn insert_code(&self, code: &str, package: &str) -> Result<AccessCodeRow> {
        Db::insert_code(self, code, package).await
    }
}

// ---------------------------------------------------------------------------
// Package lookups
// ---------------------------------------------------------------------------

pub fn package_prefix(package: &str) -> Option<&'static str> {
    names::PACKAGES
        .iter()
        .find(|(name, _, _)| *name == package)
        .map(|(_, _, prefix)| *prefix)
}

pub fn package_price(package: &str) -> Option<u32> {
    names::PACKAGES
        .iter()
        .find(|(name, _, _)| *name == package)
        .map(|(_, price, _)| *price)
}

// ---------------------------------------------------------------------------
// Outcome enum
// ---------------------------------------------------------------------------

pub enum GenerateOutcome {
    Generated(Vec<AccessCodeRow>),
    /// The package name does not match any known package.
    UnknownPackage,
    /// The requested count is outside 1..=MAX_CODES_PER_BATCH.
    InvalidCount,
}

// ---------------------------------------------------------------------------
// CodeService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CodeService<R: CodeRepository = Db> {
    repo: R,
}

impl<R: CodeRepository> CodeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Generate a batch of access codes for one package. Each code is
    /// `PREFIX-XXXXXX` over A-Z0-9, retried until unused.
    pub async fn generate(&self, package: &str, count: i64) -> Result<GenerateOutcome> {
        if !(1..=names::MAX_CODES_PER_BATCH).contains(&count) {
            return Ok(GenerateOutcome::InvalidCount);
        }

        let Some(prefix) = package_prefix(package) else {
            return Ok(GenerateOutcome::UnknownPackage);
        };

        let mut codes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let code = self.unique_code(prefix).await?;
            codes.push(self.repo.insert_code(&code, package).await?);
        }

        tracing::info!("{count} access codes generated for '{package}'");
        Ok(GenerateOutcome::Generated(codes))
    }

    async fn unique_code(&self, prefix: &str) -> Result<String> {
        loop {
            let code = random_code(prefix, &mut rand::thread_rng());
            if !self.repo.code_exists(&code).await? {
                return Ok(code);
            }
        }
    }
}

fn random_code<T: Rng>(prefix: &str, rng: &mut T) -> String {
    let suffix: String = (0..names::CODE_SUFFIX_LEN)
        .map(|_| names::CODE_CHARSET[rng.gen_range(0..names::CODE_CHARSET.len())] as char)
        .collect();
    format!("{prefix}-{suffix}")
}

// ---------------------------------------------------------------------------
// Text export
// ---------------------------------------------------------------------------

/// Render the downloadable plain-text listing: one block per code,
/// separated by a dashed rule.
pub fn export_text(codes: &[AccessCodeRow]) -> String {
    codes
        .iter()
        .map(|code| {
            format!(
                "Code: {}\nPackage: {}\nGenerated: {}\nStatus: {}\n{}",
                code.code,
                code.package,
                code.created_at.format("%Y-%m-%d %H:%M"),
                code.status,
                "-".repeat(30),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Attachment filename: `toothquest-access-codes-<package-slug>-<date>.txt`.
pub fn export_filename(package: &str, date: chrono::NaiveDate) -> String {
    let slug = if package.is_empty() {
        "all".to_string()
    } else {
        package.to_lowercase().replace(' ', "-")
    };
    format!("toothquest-access-codes-{slug}-{date}.txt")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn code_row(id: i64, code: &str, package: &str, status: &str) -> AccessCodeRow {
        AccessCodeRow {
            id,
            code: code.to_string(),
            package: package.to_string(),
            status: status.to_string(),
            used_by: None,
            used_date: None,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn package_lookups_cover_the_catalog() {
        assert_eq!(package_prefix("1st Year Package"), Some("TQ1"));
        assert_eq!(package_prefix("Complete Package"), Some("TQC"));
        assert_eq!(package_prefix("Unknown"), None);
        assert_eq!(package_price("5th Year Package"), Some(2500));
        assert_eq!(package_price("Complete Package"), Some(4500));
    }

    #[test]
    fn random_code_has_prefix_and_six_char_suffix() {
        let mut rng = rand::thread_rng();
        let code = random_code("TQ3", &mut rng);
        let (prefix, suffix) = code.split_once('-').unwrap();
        assert_eq!(prefix, "TQ3");
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[tokio::test]
    async fn generate_rejects_unknown_package() {
        let mock = MockCodeRepository::new();
        let svc = CodeService::new(mock);
        let outcome = svc.generate("Platinum Package", 5).await.unwrap();
        assert!(matches!(outcome, GenerateOutcome::UnknownPackage));
    }

    #[tokio::test]
    async fn generate_rejects_out_of_range_counts() {
        let mock = MockCodeRepository::new();
        let svc = CodeService::new(mock);
        let outcome = svc.generate("1st Year Package", 0).await.unwrap();
        assert!(matches!(outcome, GenerateOutcome::InvalidCount));

        let mock = MockCodeRepository::new();
        let svc = CodeService::new(mock);
        let outcome = svc.generate("1st Year Package", 101).await.unwrap();
        assert!(matches!(outcome, GenerateOutcome::InvalidCount));
    }

    #[tokio::test]
    async fn generate_inserts_the_requested_count() {
        let mut mock = MockCodeRepository::new();
        mock.expect_code_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock.expect_insert_code()
            .times(3)
            .returning(|code, package| {
                let code = code.to_string();
                let package = package.to_string();
                Box::pin(async move { Ok(code_row(1, &code, &package, "unused")) })
            });

        let svc = CodeService::new(mock);
        let outcome = svc.generate("2nd Year Package", 3).await.unwrap();

        let GenerateOutcome::Generated(codes) = outcome else {
            panic!("expected Generated");
        };
        assert_eq!(codes.len(), 3);
        assert!(codes.iter().all(|c| c.code.starts_with("TQ2-")));
    }

    #[tokio::test]
    async fn generate_retries_on_collision() {
        let mut mock = MockCodeRepository::new();
        let mut first = true;
        mock.expect_code_exists().returning(move |_| {
            let exists = first;
            first = false;
            Box::pin(async move { Ok(exists) })
        });
        mock.expect_insert_code().times(1).returning(|code, package| {
            let code = code.to_string();
            let package = package.to_string();
            Box::pin(async move { Ok(code_row(1, &code, &package, "unused")) })
        });

        let svc = CodeService::new(mock);
        let outcome = svc.generate("Complete Package", 1).await.unwrap();
        assert!(matches!(outcome, GenerateOutcome::Generated(codes) if codes.len() == 1));
    }

    #[test]
    fn export_text_lists_every_code_block() {
        let codes = vec![
            code_row(1, "TQ1-AAAAAA", "1st Year Package", "unused"),
            code_row(2, "TQ1-BBBBBB", "1st Year Package", "used"),
        ];
        let text = export_text(&codes);
        assert!(text.contains("Code: TQ1-AAAAAA"));
        assert!(text.contains("Code: TQ1-BBBBBB"));
        assert!(text.contains("Package: 1st Year Package"));
        assert!(text.contains("Status: used"));
        assert!(text.contains(&"-".repeat(30)));
    }

    #[test]
    fn export_filename_slugs_the_package() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            export_filename("1st Year Package", date),
            "toothquest-access-codes-1st-year-package-2025-06-01.txt"
        );
        assert_eq!(
            export_filename("", date),
            "toothquest-access-codes-all-2025-06-01.txt"
        );
    }
}
