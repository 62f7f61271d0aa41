//! Source type to canonical taxonomy mapping.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Prefix applied to source types with no table entry.
pub const FALLBACK_PREFIX: &str = "terraform.";

const TYPE_TABLE: &[(&str, &str)] = &[
    // AWS
    ("aws_instance", "ec2.instance"),
    ("aws_vpc", "ec2.vpc"),
    ("aws_subnet", "ec2.subnet"),
    ("aws_security_group", "ec2.security_group"),
    ("aws_ebs_volume", "ec2.volume"),
    ("aws_eip", "ec2.elastic_ip"),
    ("aws_s3_bucket", "s3.bucket"),
    ("aws_db_instance", "rds.instance"),
    ("aws_lambda_function", "lambda.function"),
    ("aws_iam_role", "iam.role"),
    ("aws_iam_user", "iam.user"),
    ("aws_iam_policy", "iam.policy"),
    ("aws_lb", "elb.load_balancer"),
    ("aws_dynamodb_table", "dynamodb.table"),
    ("aws_sqs_queue", "sqs.queue"),
    ("aws_sns_topic", "sns.topic"),
    ("aws_eks_cluster", "eks.cluster"),
    ("aws_ecs_cluster", "ecs.cluster"),
    ("aws_cloudfront_distribution", "cloudfront.distribution"),
    ("aws_route53_zone", "route53.zone"),
    ("aws_kms_key", "kms.key"),
    // Azure
    ("azurerm_virtual_machine", "azure.compute.vm"),
    ("azurerm_linux_virtual_machine", "azure.compute.vm"),
    ("azurerm_windows_virtual_machine", "azure.compute.vm"),
    ("azurerm_storage_account", "azure.storage.account"),
    ("azurerm_resource_group", "azure.resource_group"),
    ("azurerm_virtual_network", "azure.network.vnet"),
    ("azurerm_subnet", "azure.network.subnet"),
    ("azurerm_network_security_group", "azure.network.nsg"),
    ("azurerm_sql_server", "azure.sql.server"),
    ("azurerm_kubernetes_cluster", "azure.aks.cluster"),
    ("azurerm_key_vault", "azure.keyvault.vault"),
    // GCP
    ("google_compute_instance", "gcp.compute.instance"),
    ("google_compute_network", "gcp.compute.network"),
    ("google_compute_subnetwork", "gcp.compute.subnetwork"),
    ("google_compute_firewall", "gcp.compute.firewall"),
    ("google_storage_bucket", "gcp.storage.bucket"),
    ("google_sql_database_instance", "gcp.sql.instance"),
    ("google_container_cluster", "gcp.gke.cluster"),
    ("google_cloudfunctions_function", "gcp.functions.function"),
    ("google_pubsub_topic", "gcp.pubsub.topic"),
    ("google_service_account", "gcp.iam.service_account"),
];

fn table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| TYPE_TABLE.iter().copied().collect())
}

/// Maps source type identifiers to the canonical dotted taxonomy.
///
/// Lookups are exact and case-sensitive. Unknown types map to
/// `terraform.<sourceType>`, so the mapping is total.
pub struct TypeMapper;

impl TypeMapper {
    /// Returns the canonical type for a source type.
    pub fn map(source_type: &str) -> String {
        match table().get(source_type) {
            Some(canonical) => (*canonical).to_string(),
            None => format!("{}{}", FALLBACK_PREFIX, source_type),
        }
    }

    /// Returns true if the source type has a table entry.
    pub fn is_mapped(source_type: &str) -> bool {
        table().contains_key(source_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(TypeMapper::map("aws_instance"), "ec2.instance");
        assert_eq!(TypeMapper::map("aws_s3_bucket"), "s3.bucket");
        assert_eq!(TypeMapper::map("google_storage_bucket"), "gcp.storage.bucket");
        assert_eq!(
            TypeMapper::map("azurerm_linux_virtual_machine"),
            "azure.compute.vm"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(TypeMapper::map("foo_widget"), "terraform.foo_widget");
        assert!(!TypeMapper::is_mapped("foo_widget"));
        assert_eq!(TypeMapper::map(""), "terraform.");
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(TypeMapper::map("AWS_INSTANCE"), "terraform.AWS_INSTANCE");
        assert!(TypeMapper::is_mapped("aws_instance"));
    }

    #[test]
    fn test_deterministic() {
        for (source, _) in TYPE_TABLE {
            assert_eq!(TypeMapper::map(source), TypeMapper::map(source));
        }
    }

    #[test]
    fn test_table_has_no_duplicate_keys() {
        assert_eq!(table().len(), TYPE_TABLE.len());
    }
}
