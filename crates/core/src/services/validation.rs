//! Event submission validation.
//!
//! Field-level limits come from the `validator` derive on [`EventDraft`].
//! Cross-field rules are an ordered list of named predicates in [`RULES`];
//! every failing rule is reported, keyed by the request field it concerns.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use plaza_db::entities::event_voting_option;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::schedule::Slot;

/// Maximum number of tags per event.
pub const MAX_TAGS: usize = 5;

/// Allowed tag length in characters.
pub const TAG_LENGTH: std::ops::RangeInclusive<usize> = 3..=30;

/// Minimum number of candidate slots on a voting event.
pub const MIN_VOTING_OPTIONS: usize = 2;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid time pattern"));

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// A candidate slot as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingOptionDraft {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
}

impl VotingOptionDraft {
    fn slot(&self) -> Option<Slot> {
        Some(Slot::new(
            parse_date(&self.date)?,
            parse_time(&self.start_time)?,
            parse_time(&self.end_time)?,
        ))
    }
}

impl From<&event_voting_option::Model> for VotingOptionDraft {
    fn from(option: &event_voting_option::Model) -> Self {
        Self {
            date: format_date(option.date),
            start_time: format_time(option.start_time),
            end_time: format_time(option.end_time),
        }
    }
}

/// Raw event submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[validate(length(
        min = 5,
        max = 100,
        message = "Title must be between 5 and 100 characters"
    ))]
    pub title: String,
    #[validate(length(
        min = 5,
        max = 500,
        message = "Description must be between 5 and 500 characters"
    ))]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Storage key of a newly uploaded image.
    pub image: Option<String>,
    /// URL of the image already attached (edit mode).
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 256, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub allow_voting: bool,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub voting_options: Vec<VotingOptionDraft>,
    pub voting_end_date: Option<String>,
    pub voting_end_time: Option<String>,
    #[validate(length(max = 512, message = "Recording link is too long"))]
    pub recording_link: Option<String>,
}

/// Whether the draft creates a new event or edits a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    /// `existing_date` is the stored fixed date, if any.
    Edit { existing_date: Option<NaiveDate> },
}

/// Everything the rules need besides the draft.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub now: NaiveDateTime,
    pub mode: ValidationMode,
}

impl ValidationContext {
    #[must_use]
    pub const fn create(now: NaiveDateTime) -> Self {
        Self {
            now,
            mode: ValidationMode::Create,
        }
    }

    #[must_use]
    pub const fn edit(now: NaiveDateTime, existing_date: Option<NaiveDate>) -> Self {
        Self {
            now,
            mode: ValidationMode::Edit { existing_date },
        }
    }
}

/// A failed rule: the offending field and a human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldViolation {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

type Rule = fn(&EventDraft, &ValidationContext) -> Option<FieldViolation>;

/// Cross-field rules, evaluated in order. The name doubles as error code.
pub const RULES: &[(&'static str, Rule)] = &[
    ("image_present", image_present),
    ("tags_count", tags_count),
    ("tags_unique", tags_unique),
    ("tags_length", tags_length),
    ("date_required", date_required),
    ("start_time_required", start_time_required),
    ("end_time_required", end_time_required),
    ("date_format", date_format),
    ("start_time_format", start_time_format),
    ("end_time_format", end_time_format),
    ("fixed_time_order", fixed_time_order),
    ("voting_options_count", voting_options_count),
    ("voting_option_format", voting_option_format),
    ("voting_option_time_order", voting_option_time_order),
    ("voting_options_unique", voting_options_unique),
    ("voting_end_date_required", voting_end_date_required),
    ("voting_end_time_required", voting_end_time_required),
    ("voting_end_date_format", voting_end_date_format),
    ("voting_end_time_format", voting_end_time_format),
    ("voting_deadline_not_past", voting_deadline_not_past),
    (
        "voting_deadline_precedes_options",
        voting_deadline_precedes_options,
    ),
];

/// How the event will be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSchedule {
    Fixed(Slot),
    Voting {
        /// In submission order.
        options: Vec<Slot>,
        deadline: NaiveDateTime,
    },
}

/// A draft that passed every rule, with parsed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Storage key of the cover image.
    pub image: String,
    pub location: String,
    pub recording_link: Option<String>,
    pub schedule: EventSchedule,
}

impl ValidatedEvent {
    #[must_use]
    pub const fn allow_voting(&self) -> bool {
        matches!(self.schedule, EventSchedule::Voting { .. })
    }
}

/// Validate a draft, reporting every violated rule at once.
pub fn validate_event(
    draft: &EventDraft,
    ctx: &ValidationContext,
) -> Result<ValidatedEvent, ValidationErrors> {
    let mut errors = match draft.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    for &(code, rule) in RULES {
        if let Some(violation) = rule(draft, ctx) {
            errors.add(
                violation.field,
                ValidationError::new(code).with_message(Cow::Borrowed(violation.message)),
            );
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    build_validated(draft).ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(
            "schedule",
            ValidationError::new("schedule").with_message(Cow::Borrowed("Invalid schedule")),
        );
        errors
    })
}

fn build_validated(draft: &EventDraft) -> Option<ValidatedEvent> {
    let schedule = if draft.allow_voting {
        let options = draft
            .voting_options
            .iter()
            .map(VotingOptionDraft::slot)
            .collect::<Option<Vec<_>>>()?;
        let deadline = present_date(draft.voting_end_date.as_deref())?
            .and_time(present_time(draft.voting_end_time.as_deref())?);
        EventSchedule::Voting { options, deadline }
    } else {
        EventSchedule::Fixed(Slot::new(
            present_date(draft.date.as_deref())?,
            present_time(draft.start_time.as_deref())?,
            present_time(draft.end_time.as_deref())?,
        ))
    };

    Some(ValidatedEvent {
        title: draft.title.clone(),
        description: draft.description.clone(),
        tags: draft.tags.clone(),
        image: image_key(draft)?,
        location: draft.location.clone(),
        recording_link: present(draft.recording_link.as_deref()).map(ToString::to_string),
        schedule,
    })
}

/// Storage key of the image: the uploaded key, or the last path segment of
/// the kept image URL.
#[must_use]
pub fn image_key(draft: &EventDraft) -> Option<String> {
    if let Some(image) = present(draft.image.as_deref()) {
        return Some(image.to_string());
    }

    let url = present(draft.image_url.as_deref())?;
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
}

/// Parse a `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse a zero-padded 24h `HH:MM` time.
#[must_use]
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    if !TIME_RE.is_match(value) {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a trimmed date the same way the format rules see it.
fn present_date(value: Option<&str>) -> Option<NaiveDate> {
    parse_date(present(value)?)
}

fn present_time(value: Option<&str>) -> Option<NaiveTime> {
    parse_time(present(value)?)
}

// === Rules ===

fn image_present(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    image_key(draft)
        .is_none()
        .then(|| FieldViolation::new("image", "Image is required"))
}

fn tags_count(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (draft.tags.len() > MAX_TAGS)
        .then(|| FieldViolation::new("tags", "At most 5 tags are allowed"))
}

fn tags_unique(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    let mut seen = HashSet::new();
    (!draft.tags.iter().all(|tag| seen.insert(tag.as_str())))
        .then(|| FieldViolation::new("tags", "Tags must be unique"))
}

fn tags_length(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    draft
        .tags
        .iter()
        .any(|tag| !TAG_LENGTH.contains(&tag.chars().count()))
        .then(|| FieldViolation::new("tags", "Each tag must be between 3 and 30 characters"))
}

fn date_required(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (!draft.allow_voting && present(draft.date.as_deref()).is_none())
        .then(|| FieldViolation::new("date", "Date is required"))
}

fn start_time_required(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (!draft.allow_voting && present(draft.start_time.as_deref()).is_none())
        .then(|| FieldViolation::new("startTime", "Start time is required"))
}

fn end_time_required(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (!draft.allow_voting && present(draft.end_time.as_deref()).is_none())
        .then(|| FieldViolation::new("endTime", "End time is required"))
}

fn date_format(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    let date = present(draft.date.as_deref()).filter(|_| !draft.allow_voting)?;
    parse_date(date)
        .is_none()
        .then(|| FieldViolation::new("date", "Date must be formatted as YYYY-MM-DD"))
}

fn start_time_format(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    let time = present(draft.start_time.as_deref()).filter(|_| !draft.allow_voting)?;
    parse_time(time)
        .is_none()
        .then(|| FieldViolation::new("startTime", "Start time must be formatted as HH:MM"))
}

fn end_time_format(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    let time = present(draft.end_time.as_deref()).filter(|_| !draft.allow_voting)?;
    parse_time(time)
        .is_none()
        .then(|| FieldViolation::new("endTime", "End time must be formatted as HH:MM"))
}

fn fixed_time_order(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    if draft.allow_voting {
        return None;
    }
    let start = present_time(draft.start_time.as_deref())?;
    let end = present_time(draft.end_time.as_deref())?;
    (start >= end).then(|| FieldViolation::new("endTime", "End time must be after start time"))
}

fn voting_options_count(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (draft.allow_voting && draft.voting_options.len() < MIN_VOTING_OPTIONS).then(|| {
        FieldViolation::new("votingOptions", "At least two voting options are required")
    })
}

fn voting_option_format(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (draft.allow_voting && draft.voting_options.iter().any(|o| o.slot().is_none())).then(|| {
        FieldViolation::new(
            "votingOptions",
            "Each voting option needs a YYYY-MM-DD date and HH:MM times",
        )
    })
}

fn voting_option_time_order(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (draft.allow_voting
        && draft
            .voting_options
            .iter()
            .filter_map(VotingOptionDraft::slot)
            .any(|slot| slot.start_time >= slot.end_time))
    .then(|| {
        FieldViolation::new(
            "votingOptions",
            "Each voting option must end after it starts",
        )
    })
}

fn voting_options_unique(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    if !draft.allow_voting {
        return None;
    }
    let mut seen = HashSet::new();
    (!draft.voting_options.iter().all(|option| seen.insert(option)))
        .then(|| FieldViolation::new("votingOptions", "Voting options must be unique"))
}

fn voting_end_date_required(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (draft.allow_voting && present(draft.voting_end_date.as_deref()).is_none())
        .then(|| FieldViolation::new("votingEndDate", "Voting end date is required"))
}

fn voting_end_time_required(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    (draft.allow_voting && present(draft.voting_end_time.as_deref()).is_none())
        .then(|| FieldViolation::new("votingEndTime", "Voting end time is required"))
}

fn voting_end_date_format(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    let date = present(draft.voting_end_date.as_deref()).filter(|_| draft.allow_voting)?;
    parse_date(date).is_none().then(|| {
        FieldViolation::new("votingEndDate", "Voting end date must be formatted as YYYY-MM-DD")
    })
}

fn voting_end_time_format(draft: &EventDraft, _: &ValidationContext) -> Option<FieldViolation> {
    let time = present(draft.voting_end_time.as_deref()).filter(|_| draft.allow_voting)?;
    parse_time(time).is_none().then(|| {
        FieldViolation::new("votingEndTime", "Voting end time must be formatted as HH:MM")
    })
}

fn voting_deadline_not_past(draft: &EventDraft, ctx: &ValidationContext) -> Option<FieldViolation> {
    if !draft.allow_voting {
        return None;
    }
    // Editing an event without a fixed date tolerates a lapsed deadline.
    if ctx.mode == (ValidationMode::Edit { existing_date: None }) {
        return None;
    }

    let end_date = present_date(draft.voting_end_date.as_deref())?;
    let today = ctx.now.date();
    if end_date < today {
        return Some(FieldViolation::new(
            "votingEndDate",
            "Voting end date cannot be in the past",
        ));
    }

    let end_time = present_time(draft.voting_end_time.as_deref())?;
    (end_date == today && end_time <= ctx.now.time()).then(|| {
        FieldViolation::new("votingEndTime", "Voting end time must be in the future")
    })
}

fn voting_deadline_precedes_options(
    draft: &EventDraft,
    _: &ValidationContext,
) -> Option<FieldViolation> {
    if !draft.allow_voting {
        return None;
    }
    let end_date = present_date(draft.voting_end_date.as_deref())?;
    let end_time = present_time(draft.voting_end_time.as_deref())?;

    draft
        .voting_options
        .iter()
        .filter_map(VotingOptionDraft::slot)
        .any(|slot| {
            slot.date < end_date || (slot.date == end_date && slot.start_time <= end_time)
        })
        .then(|| {
            FieldViolation::new(
                "votingEndDate",
                "Voting must end before the earliest voting option starts",
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plaza_db::test_utils::fixtures;

    fn now() -> NaiveDateTime {
        fixtures::date("2024-05-20").and_time(fixtures::time("12:00"))
    }

    fn option(date: &str, start: &str, end: &str) -> VotingOptionDraft {
        VotingOptionDraft {
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    fn fixed_draft() -> EventDraft {
        EventDraft {
            title: "Board game night".to_string(),
            description: "Bring your favourite games".to_string(),
            tags: vec!["games".to_string(), "social".to_string()],
            image: Some("cover.png".to_string()),
            location: "Community hall".to_string(),
            date: Some("2024-06-01".to_string()),
            start_time: Some("18:00".to_string()),
            end_time: Some("21:00".to_string()),
            ..EventDraft::default()
        }
    }

    fn voting_draft() -> EventDraft {
        EventDraft {
            allow_voting: true,
            date: None,
            start_time: None,
            end_time: None,
            voting_options: vec![
                option("2024-06-01", "10:00", "11:00"),
                option("2024-06-02", "14:00", "15:00"),
            ],
            voting_end_date: Some("2024-05-30".to_string()),
            voting_end_time: Some("23:59".to_string()),
            ..fixed_draft()
        }
    }

    fn codes_for(errors: &ValidationErrors, field: &str) -> Vec<String> {
        errors
            .field_errors()
            .iter()
            .filter(|(name, _)| AsRef::<str>::as_ref(name) == field)
            .flat_map(|(_, errs)| errs.iter().map(|e| e.code.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_fixed_event_round_trips() {
        let validated = validate_event(&fixed_draft(), &ValidationContext::create(now())).unwrap();

        assert_eq!(validated.title, "Board game night");
        assert_eq!(validated.image, "cover.png");
        assert!(!validated.allow_voting());
        assert_eq!(
            validated.schedule,
            EventSchedule::Fixed(Slot::new(
                fixtures::date("2024-06-01"),
                fixtures::time("18:00"),
                fixtures::time("21:00"),
            ))
        );
    }

    #[test]
    fn test_valid_voting_event() {
        let validated =
            validate_event(&voting_draft(), &ValidationContext::create(now())).unwrap();

        let EventSchedule::Voting { options, deadline } = validated.schedule else {
            panic!("expected a voting schedule");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(
            deadline,
            fixtures::date("2024-05-30").and_time(fixtures::time("23:59"))
        );
    }

    #[test]
    fn test_field_limits() {
        let draft = EventDraft {
            title: "Hey".to_string(),
            description: "x".repeat(501),
            location: String::new(),
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("location"));
    }

    #[test]
    fn test_tag_rules() {
        let ctx = ValidationContext::create(now());
        let long = "x".repeat(31);
        let cases: Vec<(Vec<&str>, &str)> = vec![
            (vec!["ab"], "tags_length"),
            (vec![long.as_str()], "tags_length"),
            (vec!["music", "music"], "tags_unique"),
            (vec!["one", "two", "three", "four", "five", "six"], "tags_count"),
        ];

        for (tags, code) in cases {
            let draft = EventDraft {
                tags: tags.iter().map(ToString::to_string).collect(),
                ..fixed_draft()
            };
            let errors = validate_event(&draft, &ctx).unwrap_err();
            assert!(
                codes_for(&errors, "tags").contains(&code.to_string()),
                "{tags:?} should fail {code}"
            );
        }
    }

    #[test]
    fn test_tag_uniqueness_is_case_sensitive() {
        let draft = EventDraft {
            tags: vec!["Music".to_string(), "music".to_string()],
            ..fixed_draft()
        };
        assert!(validate_event(&draft, &ValidationContext::create(now())).is_ok());
    }

    #[test]
    fn test_tag_length_counts_characters() {
        let draft = EventDraft {
            tags: vec!["äöü".to_string()],
            ..fixed_draft()
        };
        assert!(validate_event(&draft, &ValidationContext::create(now())).is_ok());
    }

    #[test]
    fn test_image_required_unless_url_kept() {
        let ctx = ValidationContext::create(now());
        let draft = EventDraft {
            image: None,
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(codes_for(&errors, "image"), vec!["image_present"]);

        let draft = EventDraft {
            image: None,
            image_url: Some("https://cdn.example/events/abc123.png?v=2".to_string()),
            ..fixed_draft()
        };
        assert_eq!(validate_event(&draft, &ctx).unwrap().image, "abc123.png");
    }

    #[test]
    fn test_fixed_schedule_required_fields() {
        let draft = EventDraft {
            date: None,
            start_time: Some(String::new()),
            end_time: None,
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();

        assert_eq!(codes_for(&errors, "date"), vec!["date_required"]);
        assert_eq!(codes_for(&errors, "startTime"), vec!["start_time_required"]);
        assert_eq!(codes_for(&errors, "endTime"), vec!["end_time_required"]);
    }

    #[test]
    fn test_fixed_schedule_formats_and_order() {
        let ctx = ValidationContext::create(now());

        let draft = EventDraft {
            date: Some("01/06/2024".to_string()),
            start_time: Some("9:00".to_string()),
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(codes_for(&errors, "date"), vec!["date_format"]);
        assert_eq!(codes_for(&errors, "startTime"), vec!["start_time_format"]);

        let draft = EventDraft {
            start_time: Some("21:00".to_string()),
            end_time: Some("21:00".to_string()),
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(codes_for(&errors, "endTime"), vec!["fixed_time_order"]);
    }

    #[test]
    fn test_padded_schedule_values_are_trimmed() {
        let ctx = ValidationContext::create(now());

        let draft = EventDraft {
            date: Some(" 2024-06-01 ".to_string()),
            start_time: Some(" 18:00".to_string()),
            end_time: Some("21:00 ".to_string()),
            ..fixed_draft()
        };
        let validated = validate_event(&draft, &ctx).unwrap();
        assert_eq!(
            validated.schedule,
            EventSchedule::Fixed(Slot::new(
                fixtures::date("2024-06-01"),
                fixtures::time("18:00"),
                fixtures::time("21:00"),
            ))
        );

        // Padding must not hide an ordering violation behind a generic error
        let draft = EventDraft {
            start_time: Some(" 21:00".to_string()),
            end_time: Some("20:00 ".to_string()),
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(codes_for(&errors, "endTime"), vec!["fixed_time_order"]);
        assert!(codes_for(&errors, "schedule").is_empty());

        let draft = EventDraft {
            voting_end_date: Some(" 2024-05-19 ".to_string()),
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(
            codes_for(&errors, "votingEndDate"),
            vec!["voting_deadline_not_past"]
        );

        let draft = EventDraft {
            voting_end_time: Some("23:59 ".to_string()),
            ..voting_draft()
        };
        let EventSchedule::Voting { deadline, .. } = validate_event(&draft, &ctx).unwrap().schedule
        else {
            panic!("expected a voting schedule");
        };
        assert_eq!(
            deadline,
            fixtures::date("2024-05-30").and_time(fixtures::time("23:59"))
        );
    }

    #[test]
    fn test_voting_options_count() {
        let draft = EventDraft {
            voting_options: vec![option("2024-06-01", "10:00", "11:00")],
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();
        assert_eq!(
            codes_for(&errors, "votingOptions"),
            vec!["voting_options_count"]
        );
    }

    #[test]
    fn test_voting_options_unique() {
        let draft = EventDraft {
            voting_options: vec![
                option("2024-06-01", "10:00", "11:00"),
                option("2024-06-02", "14:00", "15:00"),
                option("2024-06-01", "10:00", "11:00"),
            ],
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();
        assert_eq!(
            codes_for(&errors, "votingOptions"),
            vec!["voting_options_unique"]
        );
    }

    #[test]
    fn test_voting_option_format_and_order() {
        let draft = EventDraft {
            voting_options: vec![
                option("2024-06-01", "11:00", "10:00"),
                option("2024-06-02", "25:00", "26:00"),
            ],
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();
        let codes = codes_for(&errors, "votingOptions");

        assert!(codes.contains(&"voting_option_format".to_string()));
        assert!(codes.contains(&"voting_option_time_order".to_string()));
    }

    #[test]
    fn test_voting_deadline_required() {
        let draft = EventDraft {
            voting_end_date: None,
            voting_end_time: None,
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();

        assert_eq!(
            codes_for(&errors, "votingEndDate"),
            vec!["voting_end_date_required"]
        );
        assert_eq!(
            codes_for(&errors, "votingEndTime"),
            vec!["voting_end_time_required"]
        );
    }

    #[test]
    fn test_voting_deadline_not_past() {
        let ctx = ValidationContext::create(now());

        let draft = EventDraft {
            voting_end_date: Some("2024-05-19".to_string()),
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(
            codes_for(&errors, "votingEndDate"),
            vec!["voting_deadline_not_past"]
        );

        // Same day: time must be strictly after now (12:00)
        let draft = EventDraft {
            voting_end_date: Some("2024-05-20".to_string()),
            voting_end_time: Some("12:00".to_string()),
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(
            codes_for(&errors, "votingEndTime"),
            vec!["voting_deadline_not_past"]
        );

        let draft = EventDraft {
            voting_end_date: Some("2024-05-20".to_string()),
            voting_end_time: Some("12:01".to_string()),
            ..voting_draft()
        };
        assert!(validate_event(&draft, &ctx).is_ok());
    }

    #[test]
    fn test_edit_without_fixed_date_tolerates_lapsed_deadline() {
        let later = fixtures::date("2024-05-31").and_time(fixtures::time("09:00"));

        let edit = ValidationContext::edit(later, None);
        assert!(validate_event(&voting_draft(), &edit).is_ok());

        let create = ValidationContext::create(later);
        assert!(validate_event(&voting_draft(), &create).is_err());

        let edit_with_date = ValidationContext::edit(later, Some(fixtures::date("2024-06-01")));
        assert!(validate_event(&voting_draft(), &edit_with_date).is_err());
    }

    #[test]
    fn test_deadline_must_precede_every_option() {
        let ctx = ValidationContext::create(now());

        // Deadline after the first option's day
        let draft = EventDraft {
            voting_end_date: Some("2024-06-01".to_string()),
            voting_end_time: Some("09:00".to_string()),
            voting_options: vec![
                option("2024-05-31", "10:00", "11:00"),
                option("2024-06-02", "14:00", "15:00"),
            ],
            ..voting_draft()
        };
        let errors = validate_event(&draft, &ctx).unwrap_err();
        assert_eq!(
            codes_for(&errors, "votingEndDate"),
            vec!["voting_deadline_precedes_options"]
        );

        // Same day: deadline equal to start is not strictly before
        let draft = EventDraft {
            voting_end_date: Some("2024-06-01".to_string()),
            voting_end_time: Some("10:00".to_string()),
            ..voting_draft()
        };
        assert!(validate_event(&draft, &ctx).is_err());

        let draft = EventDraft {
            voting_end_date: Some("2024-06-01".to_string()),
            voting_end_time: Some("09:59".to_string()),
            ..voting_draft()
        };
        assert!(validate_event(&draft, &ctx).is_ok());
    }

    #[test]
    fn test_voting_event_ignores_fixed_fields() {
        let draft = EventDraft {
            date: Some("garbage".to_string()),
            ..voting_draft()
        };
        assert!(validate_event(&draft, &ValidationContext::create(now())).is_ok());
    }

    #[test]
    fn test_reports_multiple_violations() {
        let draft = EventDraft {
            title: "Hi".to_string(),
            tags: vec!["ab".to_string()],
            image: None,
            ..fixed_draft()
        };
        let errors = validate_event(&draft, &ValidationContext::create(now())).unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("tags"));
        assert!(fields.contains_key("image"));
    }

    #[test]
    fn test_option_draft_from_model() {
        let model = fixtures::voting_option("o1", "e1", "2024-06-01", "09:05", "10:00");
        let draft = VotingOptionDraft::from(&model);

        assert_eq!(draft, option("2024-06-01", "09:05", "10:00"));
    }
}
