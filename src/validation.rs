//! Order Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Errors block submission, warnings travel with the order.

use serde::{Deserialize, Serialize};

use crate::order::OrderRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    /// Human name of the missing or bad field, as shown on the order form.
    pub field: String,
    pub message: String,
    pub remediation: Vec<String>,
}

impl ValidationViolation {
    fn error(rule: &str, field: &str, message: impl Into<String>, remediation: &str) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            field: field.to_string(),
            message: message.into(),
            remediation: vec![remediation.to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// `Please provide: Name, Phone, Files`
    pub fn summary(&self) -> String {
        let fields: Vec<&str> = self
            .violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| v.field.as_str())
            .collect();
        format!("Please provide: {}", fields.join(", "))
    }
}

/// What a rule gets to look at: the request plus the page count after
/// detection and override have been reconciled.
pub struct Submission<'a> {
    pub request: &'a OrderRequest,
    pub resolved_pages: Option<i64>,
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, submission: &Submission<'_>) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct ContactRule;

impl ValidationRule for ContactRule {
    fn name(&self) -> &'static str { "contact" }

    fn validate(&self, submission: &Submission<'_>) -> Vec<ValidationViolation> {
        let customer = &submission.request.customer;
        let mut violations = vec![];

        if customer.name.trim().is_empty() {
            violations.push(ValidationViolation::error(
                self.name(),
                "Name",
                "Customer name is required",
                "Enter your full name",
            ));
        }
        if customer.phone.trim().is_empty() {
            violations.push(ValidationViolation::error(
                self.name(),
                "Phone",
                "Phone number is required",
                "Enter a phone number for the order confirmation",
            ));
        }

        match customer.email.as_deref().map(str::trim) {
            None | Some("") => violations.push(ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                field: "Email".to_string(),
                message: "No email given, the customer will not receive a copy".to_string(),
                remediation: vec!["Add an email address to receive the order summary".to_string()],
            }),
            Some(email) if !email.contains('@') => violations.push(ValidationViolation::error(
                self.name(),
                "Email",
                format!("'{}' is not an email address", email),
                "Correct the email address or leave it empty",
            )),
            Some(_) => {}
        }

        violations
    }
}

pub struct FilesRule;

impl ValidationRule for FilesRule {
    fn name(&self) -> &'static str { "files" }

    fn validate(&self, submission: &Submission<'_>) -> Vec<ValidationViolation> {
        if submission.request.files.is_empty() {
            return vec![ValidationViolation::error(
                self.name(),
                "Files",
                "At least one document must be uploaded",
                "Upload the files to print",
            )];
        }
        vec![]
    }
}

pub struct PageCountRule;

impl ValidationRule for PageCountRule {
    fn name(&self) -> &'static str { "page_count" }

    fn validate(&self, submission: &Submission<'_>) -> Vec<ValidationViolation> {
        // Without files there is nothing to count; FilesRule reports that.
        if submission.request.files.is_empty() || submission.resolved_pages.is_some() {
            return vec![];
        }
        vec![ValidationViolation::error(
            self.name(),
            "Page count",
            "Page count could not be detected",
            "Enter the total number of pages manually",
        )]
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(ContactRule),
                Box::new(FilesRule),
                Box::new(PageCountRule),
            ],
        }
    }

    pub fn validate(&self, submission: &Submission<'_>) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(submission))
            .collect();

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::UploadedFile;
    use crate::order::CustomerContact;
    use crate::print::{ColorMode, PaperSize, PrintOptions};

    fn request(name: &str, phone: &str, email: Option<&str>, files: usize) -> OrderRequest {
        OrderRequest {
            customer: CustomerContact {
                name: name.to_string(),
                phone: phone.to_string(),
                email: email.map(str::to_string),
            },
            files: (0..files)
                .map(|i| UploadedFile::new(format!("f{}.jpg", i), "image/jpeg", vec![0xFF, 0xD8, 0xFF]))
                .collect(),
            options: PrintOptions::new(PaperSize::A4, ColorMode::BlackAndWhite),
            page_override: None,
            comments: String::new(),
        }
    }

    #[test]
    fn test_complete_order_valid() {
        let req = request("Asha", "9876543210", Some("asha@example.com"), 1);
        let result = Validator::new().validate(&Submission { request: &req, resolved_pages: Some(3) });
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_missing_fields_listed_in_order() {
        let req = request(" ", "", Some("a@b.c"), 0);
        let result = Validator::new().validate(&Submission { request: &req, resolved_pages: None });
        assert!(!result.valid);
        assert_eq!(result.summary(), "Please provide: Name, Phone, Files");
    }

    #[test]
    fn test_missing_email_only_warns() {
        let req = request("Asha", "98765", None, 1);
        let result = Validator::new().validate(&Submission { request: &req, resolved_pages: Some(1) });
        assert!(result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Warning);
    }

    #[test]
    fn test_bad_email_blocks() {
        let req = request("Asha", "98765", Some("asha.example.com"), 1);
        let result = Validator::new().validate(&Submission { request: &req, resolved_pages: Some(1) });
        assert!(result.has_errors());
    }

    #[test]
    fn test_unresolved_pages_block() {
        let req = request("Asha", "98765", Some("a@b.c"), 2);
        let result = Validator::new().validate(&Submission { request: &req, resolved_pages: None });
        assert_eq!(result.summary(), "Please provide: Page count");
    }
}
