use super::CleanProfile;

pub const NO_INFORMATION: &str = "No relevant information available.";

/// Renders a clean profile as prose, one line per satisfied fact category.
pub fn compose(profile: &CleanProfile) -> String {
    let mut summary = String::new();

    if let Some(name) = &profile.full_name {
        summary.push_str(name);
        summary.push_str(" is currently working");
        if let (Some(title), Some(company)) = (&profile.latest_job_title, &profile.latest_company) {
            summary.push_str(&format!(" as a {title} at {company}"));
        }
        summary.push_str(".\n");
    }

    if let Some(location) = &profile.location {
        summary.push_str(&format!("They are based in {location}.\n"));
    }

    if let (Some(degree), Some(institution)) = (&profile.degree, &profile.institution) {
        summary.push_str(&format!("They hold a {degree} from {institution}.\n"));
    }

    if let Some(skills) = &profile.skills {
        summary.push_str(&format!("Their key skills include {skills}.\n"));
    }

    if let Some(languages) = &profile.languages {
        summary.push_str(&format!("They are fluent in {languages}.\n"));
    }

    if let (Some(birth_date), Some(gender), Some(industry)) =
        (&profile.birth_date, &profile.gender, &profile.industry)
    {
        let subject = profile.full_name.as_deref().unwrap_or("this person");
        summary.push_str(&format!(
            "Born on {birth_date}, {gender}, {subject} works in the {industry} industry.\n"
        ));
    }

    if let Some(accomplishments) = &profile.accomplishments {
        for (label, entries) in accomplishments.categories() {
            summary.push_str(&format!("{label}: {} listed.\n", entries.len()));
        }
    }

    let summary = summary.trim();
    if summary.is_empty() {
        NO_INFORMATION.to_string()
    } else {
        summary.to_string()
    }
}
