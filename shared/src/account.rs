use serde::{Deserialize, Serialize};

use crate::{AppError, ErrorKind};

const BUNDLED_ACCOUNT: &str = include_str!("../data/account.json");

/// Header block of the account screen.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountSummary {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "img")]
    pub avatar_url: String,
}

impl AccountSummary {
    pub fn bundled() -> Result<Self, AppError> {
        serde_json::from_str(BUNDLED_ACCOUNT).map_err(|e| {
            AppError::new(ErrorKind::Deserialization, "bundled account data is invalid")
                .with_internal(e.to_string())
        })
    }

    /// Follows the profile name once one is known.
    pub fn rename(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.user_name = name.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_account_parses() {
        let account = AccountSummary::bundled().unwrap();
        assert!(!account.user_name.is_empty());
        assert!(account.avatar_url.starts_with("https://"));
    }

    #[test]
    fn test_rename_ignores_blank() {
        let mut account = AccountSummary {
            user_name: "Old".into(),
            avatar_url: String::new(),
        };
        account.rename("   ");
        assert_eq!(account.user_name, "Old");
        account.rename(" New ");
        assert_eq!(account.user_name, "New");
    }
}
