use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::RawProfile;

/// Placeholder the enrichment data uses for "no value".
pub const NOT_AVAILABLE: &str = "N/A";

/// Sparse, normalized subset of a profile. Every `Some` holds a non-empty,
/// non-sentinel value; absent fields are skipped when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accomplishments: Option<Accomplishments>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Accomplishments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honors_awards: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publications: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patents: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Value>>,
}

impl Accomplishments {
    /// Present categories with their display labels, in summary order.
    pub fn categories(&self) -> impl Iterator<Item = (&'static str, &[Value])> {
        [
            ("Accomplishments - Honors and Awards", &self.honors_awards),
            ("Publications", &self.publications),
            ("Patents", &self.patents),
            ("Projects", &self.projects),
        ]
        .into_iter()
        .filter_map(|(label, entries)| entries.as_deref().map(|e| (label, e)))
    }

    pub fn is_empty(&self) -> bool {
        self.categories().next().is_none()
    }
}

impl CleanProfile {
    /// Number of top-level fields that survived cleaning.
    pub fn field_count(&self) -> usize {
        [
            &self.full_name,
            &self.occupation,
            &self.location,
            &self.latest_job_title,
            &self.latest_company,
            &self.job_description,
            &self.degree,
            &self.institution,
            &self.skills,
            &self.languages,
            &self.birth_date,
            &self.gender,
            &self.industry,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
            + usize::from(self.accomplishments.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

/// The single absence rule: missing, null, blank and the sentinel are all
/// absent; kept strings are trimmed. Numbers and booleans are rendered as text; arrays and objects are
/// not scalar values.
fn meaningful(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.trim().is_empty() || s.trim() == NOT_AVAILABLE => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn field(raw: &RawProfile, key: &str) -> Option<String> {
    meaningful(raw.get(key))
}

/// First element of an array field, when it is an object.
fn first_entry<'a>(raw: &'a RawProfile, key: &str) -> Option<&'a serde_json::Map<String, Value>> {
    raw.get(key)?.as_array()?.first()?.as_object()
}

fn joined(raw: &RawProfile, key: &str) -> Option<String> {
    let items: Vec<&str> = raw
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!items.is_empty()).then(|| items.join(", "))
}

fn location(raw: &RawProfile) -> Option<String> {
    let city = field(raw, "city")?;
    let state = field(raw, "state").unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let country = field(raw, "country_full_name").unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Some(format!("{city}, {state}, {country}"))
}

/// Accepts either a scalar or the `{day, month, year}` object the enrichment
/// API returns; partial or impossible dates are absent.
fn birth_date(raw: &RawProfile) -> Option<String> {
    let value = raw.get("birth_date")?;
    let Some(parts) = value.as_object() else {
        return meaningful(Some(value));
    };
    let part = |key: &str| parts.get(key).and_then(Value::as_u64);
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(part("year")?).ok()?,
        u32::try_from(part("month")?).ok()?,
        u32::try_from(part("day")?).ok()?,
    )?;
    Some(date.format("%B %-d, %Y").to_string())
}

fn entries(raw: &RawProfile, key: &str) -> Option<Vec<Value>> {
    raw.get(key)?
        .as_array()
        .filter(|entries| !entries.is_empty())
        .cloned()
}

fn accomplishments(raw: &RawProfile) -> Option<Accomplishments> {
    let accomplishments = Accomplishments {
        honors_awards: entries(raw, "accomplishment_honors_awards"),
        publications: entries(raw, "accomplishment_publications"),
        patents: entries(raw, "accomplishment_patents"),
        projects: entries(raw, "accomplishment_projects"),
    };
    (!accomplishments.is_empty()).then_some(accomplishments)
}

pub fn clean(raw: &RawProfile) -> CleanProfile {
    let latest_job = first_entry(raw, "experiences");
    let latest_education = first_entry(raw, "education");

    CleanProfile {
        full_name: field(raw, "full_name"),
        occupation: field(raw, "occupation"),
        location: location(raw),
        latest_job_title: latest_job.and_then(|job| meaningful(job.get("title"))),
        latest_company: latest_job.and_then(|job| meaningful(job.get("company"))),
        job_description: latest_job.and_then(|job| meaningful(job.get("description"))),
        degree: latest_education.and_then(|edu| meaningful(edu.get("degree_name"))),
        institution: latest_education.and_then(|edu| meaningful(edu.get("school"))),
        skills: joined(raw, "skills"),
        languages: joined(raw, "languages"),
        birth_date: birth_date(raw),
        gender: field(raw, "gender"),
        industry: field(raw, "industry"),
        accomplishments: accomplishments(raw),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{raw, sample_profile};

    #[test]
    fn test_clean_sample_profile() {
        let profile = clean(&sample_profile());

        assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            profile.occupation.as_deref(),
            Some("Mathematician at Analytical Engine Co")
        );
        assert_eq!(
            profile.location.as_deref(),
            Some("London, England, United Kingdom")
        );
        assert_eq!(profile.latest_job_title.as_deref(), Some("Mathematician"));
        assert_eq!(profile.latest_company.as_deref(), Some("Analytical Engine Co"));
        assert!(profile.job_description.is_some());
        assert_eq!(profile.degree.as_deref(), Some("Certificate in Mathematics"));
        assert_eq!(profile.institution.as_deref(), Some("University of London"));
        assert_eq!(profile.skills.as_deref(), Some("Mathematics, Logic, Algorithms"));
        assert_eq!(profile.languages.as_deref(), Some("English, French"));
        assert_eq!(profile.birth_date.as_deref(), Some("December 10, 1815"));
        assert_eq!(profile.gender.as_deref(), Some("female"));
        assert_eq!(profile.industry.as_deref(), Some("Research"));

        let accomplishments = profile.accomplishments.unwrap();
        assert!(accomplishments.honors_awards.is_none());
        assert_eq!(accomplishments.publications.unwrap().len(), 1);
        assert!(accomplishments.patents.is_none());
        assert_eq!(accomplishments.projects.unwrap().len(), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_profile() {
        let profile = clean(&RawProfile::new());
        assert_eq!(profile, CleanProfile::default());
        assert!(profile.is_empty());
        assert_eq!(serde_json::to_value(&profile).unwrap(), json!({}));
    }

    #[test]
    fn test_sentinels_nulls_and_empties_are_absent() {
        let profile = clean(&raw(json!({
            "full_name": "N/A",
            "occupation": "",
            "gender": null,
            "industry": "N/A",
            "birth_date": "N/A",
            "skills": [],
            "languages": ["", null, 7],
            "accomplishment_patents": [],
        })));
        assert!(profile.is_empty(), "{profile:?}");
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let profile = clean(&raw(json!({
            "full_name": "   ",
            "occupation": "\t\n",
            "gender": " N/A ",
            "city": "  ",
            "state": "England",
            "skills": ["  ", " Logic "],
            "experiences": [{"title": " ", "company": "Analytical Engine Co"}],
        })));
        assert_eq!(profile.full_name, None);
        assert_eq!(profile.occupation, None);
        assert_eq!(profile.gender, None);
        assert_eq!(profile.location, None);
        assert_eq!(profile.latest_job_title, None);
        assert_eq!(profile.latest_company.as_deref(), Some("Analytical Engine Co"));
        assert_eq!(profile.skills.as_deref(), Some("Logic"));
        assert!(!crate::profile::compose(&profile).contains("is currently working"));
    }

    #[test]
    fn test_no_empty_value_leaks_through() {
        let inputs = vec![
            sample_profile(),
            raw(json!({"full_name": "", "city": "", "experiences": [{}], "education": [null]})),
            raw(json!({"experiences": [{"title": "", "company": "N/A", "description": null}]})),
            raw(json!({"skills": ["", ""], "accomplishment_projects": [{}]})),
            raw(json!({"full_name": 42, "gender": true, "industry": {"name": "x"}})),
        ];

        for input in inputs {
            let value = serde_json::to_value(clean(&input)).unwrap();
            for (key, v) in value.as_object().unwrap() {
                match v {
                    Value::String(s) => assert!(!s.is_empty() && s != NOT_AVAILABLE, "{key}"),
                    Value::Object(map) => {
                        assert!(!map.is_empty(), "{key}");
                        for (category, entries) in map {
                            assert!(!entries.as_array().unwrap().is_empty(), "{category}");
                        }
                    }
                    other => panic!("unexpected value for {key}: {other}"),
                }
            }
        }
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let input = sample_profile();
        assert_eq!(clean(&input), clean(&input));
    }

    #[test]
    fn test_empty_experiences_drop_job_fields() {
        let profile = clean(&raw(json!({"full_name": "Ada", "experiences": []})));
        assert!(profile.latest_job_title.is_none());
        assert!(profile.latest_company.is_none());
        assert!(profile.job_description.is_none());
        assert_eq!(profile.full_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_only_the_first_experience_is_read() {
        let profile = clean(&raw(json!({
            "experiences": [
                {"title": "Engineer", "company": null},
                {"title": "Intern", "company": "Older Co"}
            ]
        })));
        assert_eq!(profile.latest_job_title.as_deref(), Some("Engineer"));
        assert!(profile.latest_company.is_none());
    }

    #[test]
    fn test_location_requires_city() {
        let profile = clean(&raw(json!({
            "state": "England",
            "country_full_name": "United Kingdom",
        })));
        assert!(profile.location.is_none());

        let profile = clean(&raw(json!({"city": "London", "state": null})));
        assert_eq!(profile.location.as_deref(), Some("London, N/A, N/A"));

        let profile = clean(&raw(json!({"city": "N/A", "state": "England"})));
        assert!(profile.location.is_none());
    }

    #[test]
    fn test_birth_date_forms() {
        let from_parts = clean(&raw(json!({"birth_date": {"day": 9, "month": 12, "year": 1906}})));
        assert_eq!(from_parts.birth_date.as_deref(), Some("December 9, 1906"));

        let from_text = clean(&raw(json!({"birth_date": "1906-12-09"})));
        assert_eq!(from_text.birth_date.as_deref(), Some("1906-12-09"));

        let partial = clean(&raw(json!({"birth_date": {"day": null, "month": 12, "year": 1906}})));
        assert!(partial.birth_date.is_none());

        let impossible = clean(&raw(json!({"birth_date": {"day": 31, "month": 2, "year": 1906}})));
        assert!(impossible.birth_date.is_none());
    }

    #[test]
    fn test_accomplishments_keep_only_non_empty_categories() {
        let profile = clean(&raw(json!({
            "accomplishment_honors_awards": [{"title": "Medal"}],
            "accomplishment_publications": [],
            "accomplishment_patents": null,
        })));
        let accomplishments = profile.accomplishments.unwrap();
        let labels: Vec<_> = accomplishments.categories().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Accomplishments - Honors and Awards"]);
        assert_eq!(
            serde_json::to_value(&accomplishments).unwrap(),
            json!({"honors_awards": [{"title": "Medal"}]})
        );
    }

    #[test]
    fn test_field_count() {
        assert_eq!(clean(&sample_profile()).field_count(), 14);
        assert_eq!(clean(&raw(json!({"full_name": "Ada"}))).field_count(), 1);
    }
}
