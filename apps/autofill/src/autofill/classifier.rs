//! Classifier: ordered (category, pattern set, fill) rules. First match wins.
//!
//! Every pattern is a case-insensitive regex tested against the descriptor's
//! id, name, label and placeholder; any hit on any string counts.
//! Rule order matters: an "email address" field must hit Email before
//! Address ever sees it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::autofill::descriptor::FieldDescriptor;
use crate::dom::FormControl;
use crate::models::profile::Profile;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Name,
    Email,
    Phone,
    Address,
    Education,
    Experience,
    Skills,
}

/// The specific profile slot a value was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    FirstName,
    MiddleName,
    LastName,
    FullName,
    Email,
    Phone,
    Street,
    City,
    State,
    PostalCode,
    EducationSummary,
    /// A `<select>` option matched against the latest degree.
    DegreeOption,
    JobTitle,
    Company,
    Duration,
    ExperienceSummary,
    Skills,
}

impl Slot {
    pub fn category(&self) -> Category {
        match self {
            Slot::FirstName | Slot::MiddleName | Slot::LastName | Slot::FullName => Category::Name,
            Slot::Email => Category::Email,
            Slot::Phone => Category::Phone,
            Slot::Street | Slot::City | Slot::State | Slot::PostalCode => Category::Address,
            Slot::EducationSummary | Slot::DegreeOption => Category::Education,
            Slot::JobTitle | Slot::Company | Slot::Duration | Slot::ExperienceSummary => {
                Category::Experience
            }
            Slot::Skills => Category::Skills,
        }
    }
}

/// A value chosen for a field. For select controls `value` is an option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub slot: Slot,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Filled(Fill),
    /// A rule claimed the field but the profile had nothing to put in it.
    /// The field is left blank and is not offered to the AI resolver.
    Declined(Category),
    Unmatched,
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

/// A set of case-insensitive regexes matched against descriptor strings.
pub struct PatternSet(Vec<Regex>);

impl PatternSet {
    fn new(patterns: &[&str]) -> Self {
        Self(
            patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("built-in pattern must compile"))
                .collect(),
        )
    }

    pub fn matches(&self, descriptor: &FieldDescriptor) -> bool {
        self.0
            .iter()
            .any(|re| descriptor.candidates().iter().any(|s| re.is_match(s)))
    }
}

type FillFn = fn(&Profile, &FieldDescriptor, &dyn FormControl) -> Option<Fill>;

pub struct Rule {
    pub category: Category,
    patterns: PatternSet,
    fill: FillFn,
}

impl Rule {
    pub fn matches(&self, descriptor: &FieldDescriptor) -> bool {
        self.patterns.matches(descriptor)
    }

    pub fn fill(
        &self,
        profile: &Profile,
        descriptor: &FieldDescriptor,
        control: &dyn FormControl,
    ) -> Option<Fill> {
        (self.fill)(profile, descriptor, control)
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule {
            category: Category::Name,
            patterns: PatternSet::new(&[
                r"first[\s_-]*name",
                r"last[\s_-]*name",
                r"middle[\s_-]*name",
                r"full[\s_-]*name",
                r"^name$",
                r"^fname$",
                r"^lname$",
                r"^mname$",
            ]),
            fill: fill_name,
        },
        Rule {
            category: Category::Email,
            patterns: PatternSet::new(&[r"e[\s_-]*mail", r"^email$", r"^e-mail$"]),
            fill: |profile, _, _| Some(fill(Slot::Email, &profile.email)),
        },
        Rule {
            category: Category::Phone,
            patterns: PatternSet::new(&[
                r"phone",
                r"mobile",
                r"cell",
                r"telephone",
                r"tel[\s_-]*(number)?",
                r"contact[\s_-]*number",
            ]),
            fill: |profile, _, _| Some(fill(Slot::Phone, &profile.phone)),
        },
        Rule {
            category: Category::Address,
            patterns: PatternSet::new(&[
                r"address", r"street", r"city", r"state", r"province", r"zip", r"postal",
                r"country",
            ]),
            fill: fill_address,
        },
        Rule {
            category: Category::Education,
            patterns: PatternSet::new(&[
                r"education",
                r"degree",
                r"qualification",
                r"academic",
                r"university",
                r"college",
                r"school",
                r"institution",
            ]),
            fill: fill_education,
        },
        Rule {
            category: Category::Experience,
            patterns: PatternSet::new(&[
                r"experience",
                r"work[\s_-]*exp",
                r"years[\s_-]*(of)?[\s_-]*exp",
                r"job[\s_-]*title",
                r"position",
                r"employer",
                r"company",
            ]),
            fill: fill_experience,
        },
        Rule {
            category: Category::Skills,
            patterns: PatternSet::new(&[r"skills", r"abilities", r"competencies", r"expertise"]),
            fill: |profile, _, _| Some(fill(Slot::Skills, &profile.skills.join(", "))),
        },
    ]
});

static FIRST_NAME: Lazy<PatternSet> =
    Lazy::new(|| PatternSet::new(&[r"first[\s_-]*name|^fname$|^first$"]));
static MIDDLE_NAME: Lazy<PatternSet> =
    Lazy::new(|| PatternSet::new(&[r"middle[\s_-]*name|^mname$|^middle$"]));
static LAST_NAME: Lazy<PatternSet> =
    Lazy::new(|| PatternSet::new(&[r"last[\s_-]*name|^lname$|^last$"]));
static FULL_NAME: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"full[\s_-]*name|^name$"]));

static STREET: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"address|street"]));
static CITY: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"city"]));
static STATE: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"state|province"]));
static POSTAL_CODE: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"zip|postal"]));

static JOB_TITLE: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"job[\s_-]*title|position"]));
static COMPANY: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"company|employer"]));
static DURATION: Lazy<PatternSet> = Lazy::new(|| PatternSet::new(&[r"duration|years"]));

/// The rules in evaluation order.
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Runs the rules against one field.
pub fn classify(
    descriptor: &FieldDescriptor,
    profile: &Profile,
    control: &dyn FormControl,
) -> Classification {
    match rules().iter().find(|rule| rule.matches(descriptor)) {
        Some(rule) => match rule.fill(profile, descriptor, control) {
            Some(fill) => Classification::Filled(fill),
            None => Classification::Declined(rule.category),
        },
        None => Classification::Unmatched,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fill functions
// ────────────────────────────────────────────────────────────────────────────

fn fill(slot: Slot, value: &str) -> Fill {
    Fill {
        slot,
        value: value.to_string(),
    }
}

fn fill_name(profile: &Profile, d: &FieldDescriptor, _: &dyn FormControl) -> Option<Fill> {
    if FIRST_NAME.matches(d) {
        Some(fill(Slot::FirstName, &profile.first_name))
    } else if MIDDLE_NAME.matches(d) {
        Some(fill(Slot::MiddleName, &profile.middle_name))
    } else if LAST_NAME.matches(d) {
        Some(fill(Slot::LastName, &profile.last_name))
    } else if FULL_NAME.matches(d) {
        Some(fill(Slot::FullName, &profile.full_name()))
    } else {
        None
    }
}

fn fill_address(profile: &Profile, d: &FieldDescriptor, _: &dyn FormControl) -> Option<Fill> {
    if STREET.matches(d) {
        Some(fill(Slot::Street, &profile.address))
    } else if CITY.matches(d) {
        Some(fill(Slot::City, &profile.city))
    } else if STATE.matches(d) {
        Some(fill(Slot::State, &profile.state))
    } else if POSTAL_CODE.matches(d) {
        Some(fill(Slot::PostalCode, &profile.zip_code))
    } else {
        None
    }
}

fn fill_education(
    profile: &Profile,
    _: &FieldDescriptor,
    control: &dyn FormControl,
) -> Option<Fill> {
    let latest = profile.education.first()?;

    if control.is_select() {
        let degree = latest.degree.to_lowercase();
        if degree.is_empty() {
            return None;
        }
        return control
            .options()
            .into_iter()
            .find(|opt| opt.text.to_lowercase().contains(&degree))
            .map(|opt| fill(Slot::DegreeOption, &opt.value));
    }

    Some(fill(
        Slot::EducationSummary,
        &format!(
            "{} - {} ({})",
            latest.degree, latest.institution, latest.year
        ),
    ))
}

fn fill_experience(
    profile: &Profile,
    d: &FieldDescriptor,
    _: &dyn FormControl,
) -> Option<Fill> {
    let latest = profile.experience.first()?;

    if JOB_TITLE.matches(d) {
        Some(fill(Slot::JobTitle, &latest.title))
    } else if COMPANY.matches(d) {
        Some(fill(Slot::Company, &latest.company))
    } else if DURATION.matches(d) {
        Some(fill(Slot::Duration, &latest.duration))
    } else {
        Some(fill(
            Slot::ExperienceSummary,
            &format!(
                "{} at {} ({})",
                latest.title, latest.company, latest.duration
            ),
        ))
    }
}
