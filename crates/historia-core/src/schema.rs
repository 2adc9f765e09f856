//! Form field schema.
//!
//! Each form screen declares its fields here. The form collector and the
//! navigator work against these declarations rather than ad hoc lookups.

use crate::models::screen::Screen;

/// How a field is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text.
    Text,
    /// Multi-line text.
    LongText,
    /// One value out of a fixed list.
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown when the stored value is empty.
    pub default: &'static str,
}

pub const SEX_OPTIONS: &[&str] = &["Male", "Female", "Other"];

pub const HABIT_OPTIONS: &[&str] = &["Never", "Former", "Occasional", "Daily"];

/// Field that receives text recognized from an uploaded lab report image.
pub const LAB_REPORTS_FIELD: &str = "lab-reports";

const PRELIMINARY: &[FieldSpec] = &[
    FieldSpec {
        id: "name",
        label: "Full name",
        kind: FieldKind::Text,
        required: true,
        default: "",
    },
    FieldSpec {
        id: "age",
        label: "Age",
        kind: FieldKind::Text,
        required: true,
        default: "",
    },
    FieldSpec {
        id: "sex",
        label: "Sex",
        kind: FieldKind::Choice(SEX_OPTIONS),
        required: true,
        default: "Male",
    },
];

const CHIEF_COMPLAINT: &[FieldSpec] = &[
    FieldSpec {
        id: "cc-symptom",
        label: "Main symptom",
        kind: FieldKind::Text,
        required: true,
        default: "",
    },
    FieldSpec {
        id: "cc-duration",
        label: "Duration",
        kind: FieldKind::Text,
        required: true,
        default: "",
    },
];

const PAST_HISTORY: &[FieldSpec] = &[
    FieldSpec {
        id: "psh-details",
        label: "Past surgeries",
        kind: FieldKind::LongText,
        required: false,
        default: "",
    },
    FieldSpec {
        id: "meds-details",
        label: "Current medications",
        kind: FieldKind::LongText,
        required: false,
        default: "",
    },
];

const SOCIAL_HISTORY: &[FieldSpec] = &[
    FieldSpec {
        id: "social-tobacco",
        label: "Tobacco use",
        kind: FieldKind::Choice(HABIT_OPTIONS),
        required: false,
        default: "Never",
    },
    FieldSpec {
        id: "social-alcohol",
        label: "Alcohol use",
        kind: FieldKind::Choice(HABIT_OPTIONS),
        required: false,
        default: "Never",
    },
];

const LAB_REPORT: &[FieldSpec] = &[FieldSpec {
    id: LAB_REPORTS_FIELD,
    label: "Lab report findings",
    kind: FieldKind::LongText,
    required: false,
    default: "",
}];

/// Fields bound to a screen. Empty for screens without a form.
pub fn fields_for(screen: Screen) -> &'static [FieldSpec] {
    match screen {
        Screen::Preliminary => PRELIMINARY,
        Screen::ChiefComplaint => CHIEF_COMPLAINT,
        Screen::PastHistory => PAST_HISTORY,
        Screen::SocialHistory => SOCIAL_HISTORY,
        Screen::LabReport => LAB_REPORT,
        _ => &[],
    }
}

/// Look up a single field on a screen.
pub fn field(screen: Screen, id: &str) -> Option<&'static FieldSpec> {
    fields_for(screen).iter().find(|f| f.id == id)
}
