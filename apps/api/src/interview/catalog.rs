/// Domains offered for quick setup, each with the roles that can be interviewed for.
pub const CATALOG: &[(&str, &[&str])] = &[
    (
        "Cloud Computing",
        &["Cloud Architect", "Cloud Engineer", "Cloud Consultant"],
    ),
    (
        "Data Science",
        &["Data Analyst", "Machine Learning Engineer", "Data Scientist"],
    ),
    (
        "Web Development",
        &["Frontend Developer", "Backend Developer", "Full Stack Developer"],
    ),
    (
        "Cyber Security",
        &["Security Analyst", "Penetration Tester", "Security Consultant"],
    ),
];

pub fn domains() -> Vec<&'static str> {
    CATALOG.iter().map(|(domain, _)| *domain).collect()
}

/// Roles for `domain` (exact match). Unknown domains have no roles.
pub fn roles_for(domain: &str) -> Vec<&'static str> {
    CATALOG
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, roles)| roles.to_vec())
        .unwrap_or_default()
}
