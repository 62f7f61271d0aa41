//! Provider locator resolution.

use crate::models::CloudProvider;

/// Substring rules, checked in order. The first match wins.
const PROVIDER_RULES: &[(&str, CloudProvider)] = &[
    ("aws", CloudProvider::Aws),
    ("azurerm", CloudProvider::Azure),
    ("google", CloudProvider::Gcp),
];

/// Resolves a provider locator such as
/// `provider["registry.terraform.io/hashicorp/aws"]` to a canonical provider.
///
/// Matching is an unanchored, case-sensitive substring search in rule order.
/// Empty input is `Unknown`; anything else that matches no rule is `Terraform`.
pub fn resolve_provider(locator: &str) -> CloudProvider {
    if locator.is_empty() {
        return CloudProvider::Unknown;
    }

    PROVIDER_RULES
        .iter()
        .find(|(needle, _)| locator.contains(needle))
        .map(|(_, provider)| *provider)
        .unwrap_or(CloudProvider::Terraform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_locators() {
        assert_eq!(
            resolve_provider(r#"provider["registry.terraform.io/hashicorp/aws"]"#),
            CloudProvider::Aws
        );
        assert_eq!(
            resolve_provider(r#"provider["registry.terraform.io/hashicorp/azurerm"]"#),
            CloudProvider::Azure
        );
        assert_eq!(
            resolve_provider(r#"provider["registry.terraform.io/hashicorp/google"]"#),
            CloudProvider::Gcp
        );
    }

    #[test]
    fn test_empty_and_other() {
        assert_eq!(resolve_provider(""), CloudProvider::Unknown);
        assert_eq!(
            resolve_provider(r#"provider["foo/bar"]"#),
            CloudProvider::Terraform
        );
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(resolve_provider("AWS"), CloudProvider::Terraform);
        assert_eq!(resolve_provider("Google"), CloudProvider::Terraform);
    }

    #[test]
    fn test_rule_order_is_preserved() {
        // "aws" is checked first, so it wins even inside an azure locator.
        assert_eq!(resolve_provider("azurerm-aws-bridge"), CloudProvider::Aws);
        assert_eq!(resolve_provider("google-azurerm"), CloudProvider::Azure);
        // Unanchored: matches anywhere in the string.
        assert_eq!(resolve_provider("hashicorp/google-beta"), CloudProvider::Gcp);
        assert_eq!(resolve_provider("lawsuit"), CloudProvider::Aws);
    }
}
