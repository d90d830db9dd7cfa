//! Constants used throughout the certlocker core crate.

/// `DocType` reported in Pull-URI responses when none is configured.
pub const DEFAULT_DOC_TYPE: &str = "VACER";

/// Base of the locator URI returned for a resolved certificate.
pub const DEFAULT_CERTIFICATE_URI_BASE: &str = "https://moh.india.gov/vc";

/// Registry timeout when none is configured.
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 10;

/// Certificate template location, relative to the workspace root.
pub const CERTIFICATE_TEMPLATE_PATH: &str = "assets/certificate-template.pdf";

/// Registry field holding the beneficiary's name.
pub const FIELD_NAME: &str = "name";

/// Registry field holding the beneficiary's registered phone number.
pub const FIELD_MOBILE: &str = "mobile";

/// Registry field holding the enrollment code issued at registration.
pub const FIELD_PRE_ENROLLMENT_CODE: &str = "preEnrollmentCode";
