//! The "create user" form.
//!
//! Collects a name, optional date of birth, country, email, password and a
//! growable list of work experiences. [`create_user_schema`] holds the field
//! rules and messages; [`CreateUserForm`] wires them into a [`FormState`]
//! with `workExperiences` registered as a dynamic list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::error::FormError;
use crate::form::{EntryId, FormConfig, FormSnapshot, FormState, SubmitOutcome};
use crate::schema::{ObjectSchema, Schema};
use crate::sink::SubmissionSink;
use crate::validator::Validator;

/// Path of the work-experience list.
pub const WORK_EXPERIENCES: &str = "workExperiences";

/// Letters, spaces and Latin-1 accented letters.
pub const NO_SPECIAL_CHARACTERS: &str = r"^[A-Za-zÀ-ÖØ-öø-ÿ ]+$";

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 20;

/// One option of the country select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryOption {
    pub code: &'static str,
    pub label: &'static str,
}

/// Options in display order. The first entry is the unselected placeholder
/// and does not pass validation.
pub const COUNTRY_OPTIONS: &[CountryOption] = &[
    CountryOption {
        code: "",
        label: "Choose a country",
    },
    CountryOption {
        code: "US",
        label: "United States",
    },
    CountryOption {
        code: "CA",
        label: "Canada",
    },
    CountryOption {
        code: "FR",
        label: "France",
    },
    CountryOption {
        code: "DE",
        label: "Germany",
    },
];

/// Country codes accepted by the schema.
pub fn country_codes() -> impl Iterator<Item = &'static str> {
    COUNTRY_OPTIONS
        .iter()
        .map(|option| option.code)
        .filter(|code| !code.is_empty())
}

/// A validated work experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub description: String,
    /// Months.
    pub duration: u32,
}

impl WorkExperience {
    /// The blank entry added by "Add work experience".
    pub fn draft() -> Value {
        json!({"title": "", "description": "", "duration": 0})
    }
}

/// The validated form output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<String>,
    pub countries: String,
    pub email: String,
    pub password: String,
    pub work_experiences: Vec<WorkExperience>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn work_experience_schema() -> ObjectSchema {
    Schema::object()
        .field(
            "title",
            Schema::string().non_empty().error("Job title is required."),
        )
        .field(
            "description",
            Schema::string()
                .non_empty()
                .error("Responsibilities description is required."),
        )
        .field(
            "duration",
            Schema::integer()
                .coerce()
                .error("Duration must be a whole number of months.")
                .min(1)
                .error("Duration must be at least 1 month.")
                .max(i64::from(u32::MAX))
                .error("Duration is too long."),
        )
}

/// Builds the create-user schema.
///
/// Fails only if one of the built-in patterns does not compile.
pub fn create_user_schema() -> Result<ObjectSchema, regex::Error> {
    Ok(Schema::object()
        .field(
            "name",
            Schema::string()
                .non_empty()
                .error("Name is required.")
                .refine(|name| !name.trim().is_empty())
                .error("Name is required.")
                .pattern(NO_SPECIAL_CHARACTERS)?
                .error("Name must not contain special characters"),
        )
        .optional("dateOfBirth", Schema::string())
        .field(
            "countries",
            Schema::string()
                .non_empty()
                .error("Please select a valid country.")
                .one_of(country_codes())
                .error("Please select a valid country."),
        )
        .field(
            "email",
            Schema::string()
                .non_empty()
                .error("Email is required.")
                .email()?
                .error("Invalid email format."),
        )
        .field(
            "password",
            Schema::string()
                .non_empty()
                .error("Password is required.")
                .min_len(PASSWORD_MIN_LEN)
                .error("Password must be at least 8 characters long.")
                .max_len(PASSWORD_MAX_LEN)
                .error("Password must be at most 20 characters long."),
        )
        .field(
            WORK_EXPERIENCES,
            Schema::array(work_experience_schema())
                .non_empty()
                .error("Please add at least one work experience."),
        ))
}

/// Values of a freshly mounted form.
pub fn initial_values() -> Value {
    json!({
        "name": "",
        "countries": "",
        "email": "",
        "password": "",
        "workExperiences": [],
    })
}

/// The create-user form state.
///
/// ```rust
/// use userform::{CreateUserForm, FormConfig, PrettyJsonSink};
///
/// let mut form = CreateUserForm::new(FormConfig::on_change()).unwrap();
/// form.set_field("name", "Ana").unwrap();
/// form.set_field("countries", "US").unwrap();
/// form.set_field("email", "ana@example.com").unwrap();
/// form.set_field("password", "password1").unwrap();
///
/// form.add_work_experience().unwrap();
/// form.set_field("workExperiences.0.title", "Engineer").unwrap();
/// form.set_field("workExperiences.0.description", "Built things").unwrap();
/// form.set_field("workExperiences.0.duration", "12").unwrap();
///
/// let mut sink = PrettyJsonSink::new();
/// assert!(form.submit(&mut sink).unwrap().is_accepted());
/// assert!(sink.output().contains("\"duration\": 12"));
/// ```
#[derive(Debug)]
pub struct CreateUserForm {
    state: FormState<CreateUser>,
}

impl CreateUserForm {
    pub fn new(config: FormConfig) -> Result<Self, FormError> {
        let validator = Validator::new(create_user_schema()?);
        let mut state = FormState::new(validator, config).with_values(initial_values());
        state.register_list(WORK_EXPERIENCES)?;
        Ok(Self { state })
    }

    /// Appends a blank work experience and returns its id.
    pub fn add_work_experience(&mut self) -> Result<EntryId, FormError> {
        self.state.append(WORK_EXPERIENCES, WorkExperience::draft())
    }

    /// Removes the work experience at `index`.
    pub fn remove_work_experience(&mut self, index: usize) -> Result<Value, FormError> {
        self.state.remove(WORK_EXPERIENCES, index)
    }

    /// Ids of the current work experiences, in list order.
    pub fn work_experience_ids(&self) -> Vec<EntryId> {
        self.state.snapshot().entries(WORK_EXPERIENCES).to_vec()
    }

    pub fn set_field(&mut self, path: &str, value: impl Into<Value>) -> Result<(), FormError> {
        self.state.set_field(path, value)
    }

    pub fn submit<S>(&mut self, sink: &mut S) -> Result<SubmitOutcome<CreateUser>, FormError>
    where
        S: SubmissionSink<CreateUser> + ?Sized,
    {
        self.state.submit(sink)
    }

    pub fn snapshot(&self) -> std::sync::Arc<FormSnapshot> {
        self.state.snapshot()
    }

    pub fn state(&self) -> &FormState<CreateUser> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState<CreateUser> {
        &mut self.state
    }
}
