//! Display formatting for certificate fields.
//!
//! All functions here are pure; the reference date used for age derivation is passed in.

use crate::bundle::CredentialBundle;
use crate::credential::{AgeValue, Facility};
use certlocker_render::layout::FIELD_COUNT;
use certlocker_render::DisplayFields;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

/// Dosing guidance printed under the first dose.
pub const SCHEDULE_NOTE: &str = "To be taken 28 days after 1st Dose";

const AADHAAR_MARKER: &str = "aadhaar";
const AADHAAR_MASK: &str = "XXXX XXXX XXXX ";
const MIN_PLAUSIBLE_BIRTH_YEAR: i32 = 1900;

/// Slot indices on the certificate template.
pub mod slot {
    pub const NAME: usize = 0;
    pub const AGE: usize = 1;
    pub const GENDER: usize = 2;
    pub const CERTIFICATE_ID: usize = 3;
    pub const IDENTITY: usize = 4;
    pub const VACCINE: usize = 7;
    pub const DOSE: usize = 8;
    pub const SCHEDULE: usize = 9;
    pub const FACILITY: usize = 11;
    pub const VERIFIER: usize = 12;
}

/// Mask an identity reference for display.
///
/// Identities look like `scheme:...:value`. When the identity mentions Aadhaar anywhere, only the
/// last four characters of the value are shown; otherwise the value is shown as-is.
pub fn mask_identity(identity: &str) -> String {
    let value = identity
        .rsplit_once(':')
        .map_or(identity, |(_, value)| value);

    if !identity.to_ascii_lowercase().contains(AADHAAR_MARKER) {
        return value.to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{AADHAAR_MASK}{tail}")
}

/// `DD Mon YYYY`, in the date's own offset.
pub fn format_display_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%d %b %Y").to_string()
}

/// `name, district, region`, skipping empty parts.
pub fn format_facility_address(facility: &Facility) -> String {
    [
        facility.name.as_str(),
        facility.address.district.as_str(),
        facility.address.address_region.as_str(),
    ]
    .iter()
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Parse a date of birth in ISO (`YYYY-MM-DD`) or DigiLocker (`DD-MM-YYYY`) form.
pub fn parse_dob(dob: &str) -> Option<NaiveDate> {
    let dob = dob.trim();
    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(dob, "%d-%m-%Y"))
        .ok()
}

/// Age in years for display.
///
/// A positive `age` is used as given. Otherwise the age is the difference in calendar years
/// between `today` and a plausible `dob`; failing that it is 0.
pub fn derive_age(age: &str, dob: &str, today: NaiveDate) -> u32 {
    if let Some(years) = age.trim().parse::<u32>().ok().filter(|years| *years > 0) {
        return years;
    }

    parse_dob(dob)
        .filter(|born| born.year() > MIN_PLAUSIBLE_BIRTH_YEAR)
        .map(|born| u32::try_from(today.year() - born.year()).unwrap_or(0))
        .unwrap_or(0)
}

/// Project a resolved credential onto the certificate's display slots.
///
/// The date of birth comes from the credential subject when present, else from the request.
pub fn display_fields(
    bundle: &CredentialBundle,
    request_dob: &str,
    today: NaiveDate,
) -> DisplayFields {
    let credential = bundle.credential();
    let subject = &credential.credential_subject;
    let dob = subject
        .dob
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(request_dob);

    let mut rows: [String; FIELD_COUNT] = Default::default();
    rows[slot::NAME] = subject.name.clone();
    let age = subject.age.as_ref().map(AgeValue::as_text).unwrap_or_default();
    rows[slot::AGE] = format!("{} Years", derive_age(&age, dob, today));
    rows[slot::GENDER] = subject.gender.clone();
    rows[slot::CERTIFICATE_ID] = bundle.certificate_id().to_string();
    rows[slot::IDENTITY] = mask_identity(&subject.id);
    rows[slot::SCHEDULE] = SCHEDULE_NOTE.to_string();

    if let Some(evidence) = credential.latest_evidence() {
        rows[slot::VACCINE] = evidence.vaccine.clone();
        rows[slot::DOSE] = format!(
            "{} (Batch no. {})",
            format_display_date(&evidence.date),
            evidence.batch
        );
        rows[slot::FACILITY] = format_facility_address(&evidence.facility);
        rows[slot::VERIFIER] = evidence.verifier.name.clone();
    }

    DisplayFields::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::tests::sample_credential_json;
    use crate::credential::{FacilityAddress, VaccinationCertificate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_mask_identity_masks_aadhaar() {
        assert_eq!(
            mask_identity("did:in.gov.uidai.aadhaar:123456789012"),
            "XXXX XXXX XXXX 9012"
        );
        assert_eq!(mask_identity("did:Aadhaar:12"), "XXXX XXXX XXXX 12");
    }

    #[test]
    fn test_mask_identity_leaves_other_schemes() {
        assert_eq!(mask_identity("did:in.gov.passport:Z1234567"), "Z1234567");
        assert_eq!(mask_identity("plainvalue"), "plainvalue");
    }

    #[test]
    fn test_mask_identity_masks_aadhaar_mentioned_in_value() {
        assert_eq!(mask_identity("did:pan:aadhaar1234"), "XXXX XXXX XXXX 1234");
        assert_eq!(mask_identity("AADHAAR-123456789012"), "XXXX XXXX XXXX 9012");
    }

    #[test]
    fn test_format_display_date() {
        let when = DateTime::parse_from_rfc3339("2021-01-05T23:30:00+05:30").expect("date");
        assert_eq!(format_display_date(&when), "05 Jan 2021");
    }

    #[test]
    fn test_format_facility_address() {
        let facility = Facility {
            name: "PHC Hebbal".into(),
            address: FacilityAddress {
                district: "Bengaluru Urban".into(),
                address_region: "Karnataka".into(),
                ..FacilityAddress::default()
            },
        };
        assert_eq!(
            format_facility_address(&facility),
            "PHC Hebbal, Bengaluru Urban, Karnataka"
        );

        let sparse = Facility {
            name: "PHC Hebbal".into(),
            address: FacilityAddress::default(),
        };
        assert_eq!(format_facility_address(&sparse), "PHC Hebbal");
    }

    #[test]
    fn test_derive_age_prefers_given_age() {
        assert_eq!(derive_age("34", "1950-01-01", date(2024, 6, 1)), 34);
    }

    #[test]
    fn test_derive_age_falls_back_to_dob() {
        assert_eq!(derive_age("0", "1990-05-10", date(2024, 6, 1)), 34);
        assert_eq!(derive_age("", "10-05-1990", date(2024, 6, 1)), 34);
        assert_eq!(derive_age("unknown", "1990-05-10", date(2024, 6, 1)), 34);
    }

    #[test]
    fn test_derive_age_rejects_implausible_dob() {
        assert_eq!(derive_age("0", "1850-01-01", date(2024, 6, 1)), 0);
        assert_eq!(derive_age("0", "not a date", date(2024, 6, 1)), 0);
        assert_eq!(derive_age("0", "2030-01-01", date(2024, 6, 1)), 0);
    }

    #[test]
    fn test_display_fields_order() {
        let json = sample_credential_json("Asha Rao", "2021-01-20T10:00:00Z");
        let credential = VaccinationCertificate::parse(&json).expect("parse should succeed");
        let bundle = CredentialBundle::new(
            "CERT-1".into(),
            "https://moh.india.gov/vc/CERT-1".into(),
            json,
            credential,
        );

        let fields = display_fields(&bundle, "", date(2024, 6, 1));
        let rows = fields.rows();

        assert_eq!(rows.len(), FIELD_COUNT);
        assert_eq!(rows[0], "Asha Rao");
        assert_eq!(rows[1], "34 Years");
        assert_eq!(rows[2], "Female");
        assert_eq!(rows[3], "CERT-1");
        assert_eq!(rows[4], "XXXX XXXX XXXX 9012");
        assert_eq!(rows[5], "");
        assert_eq!(rows[6], "");
        assert_eq!(rows[7], "COVISHIELD");
        assert_eq!(rows[8], "20 Jan 2021 (Batch no. 4121Z005)");
        assert_eq!(rows[9], SCHEDULE_NOTE);
        assert_eq!(rows[10], "");
        assert_eq!(rows[11], "PHC Hebbal, Bengaluru Urban, Karnataka");
        assert_eq!(rows[12], "Dr. Kumar");
    }

    #[test]
    fn test_display_fields_uses_request_dob_when_age_missing() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_credential_json("Asha Rao", "2021-01-20T10:00:00Z"))
                .expect("valid json");
        value["credentialSubject"]["age"] = serde_json::json!(0);
        let json = value.to_string();
        let credential = VaccinationCertificate::parse(&json).expect("parse should succeed");
        let bundle = CredentialBundle::new("C".into(), "u".into(), json, credential);

        let fields = display_fields(&bundle, "10-05-1990", date(2024, 6, 1));
        assert_eq!(fields.row(slot::AGE), Some("34 Years"));
    }

    fn bundle_with_subject(
        edit: impl FnOnce(&mut serde_json::Map<String, serde_json::Value>),
    ) -> CredentialBundle {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_credential_json("Asha Rao", "2021-01-20T10:00:00Z"))
                .expect("valid json");
        if let Some(subject) = value["credentialSubject"].as_object_mut() {
            edit(subject);
        }
        let json = value.to_string();
        let credential = VaccinationCertificate::parse(&json).expect("parse should succeed");
        CredentialBundle::new("C".into(), "u".into(), json, credential)
    }

    #[test]
    fn test_display_fields_derives_age_when_age_absent() {
        let bundle = bundle_with_subject(|subject| {
            subject.remove("age");
            subject.insert("dob".into(), serde_json::json!("1990-05-10"));
        });

        let fields = display_fields(&bundle, "", date(2024, 6, 1));
        assert_eq!(fields.row(slot::AGE), Some("34 Years"));
    }

    #[test]
    fn test_display_fields_derives_age_when_age_null() {
        let bundle = bundle_with_subject(|subject| {
            subject.insert("age".into(), serde_json::Value::Null);
            subject.insert("dob".into(), serde_json::json!("1990-05-10"));
        });

        let fields = display_fields(&bundle, "", date(2024, 6, 1));
        assert_eq!(fields.row(slot::AGE), Some("34 Years"));
    }
}
