//! Profile store: fetch, edit, save and cancel for the current user's profile.
//!
//! The store is pure state. It decides *whether* a request should be sent and
//! hands back a [`RequestGeneration`]; the app issues the request and feeds the
//! result back tagged with that generation. Results whose generation is no
//! longer current are dropped, so a slow response for a previous user or a
//! cancelled save can never overwrite newer state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::UserId;
use crate::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    /// Opaque display string, rendered as-is.
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    /// Any further server fields, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
}

impl ProfileDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        Self::new(profile.name.clone(), profile.email.clone())
    }

    /// Trimmed body for `PUT /users/{id}`.
    pub fn validate(&self) -> Result<ProfileUpdate, ProfileError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ProfileError::EmptyEmail);
        }
        Ok(ProfileUpdate {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestGeneration(pub u64);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Please enter a name")]
    EmptyName,

    #[error("Please enter an email")]
    EmptyEmail,

    #[error("No profile is loaded")]
    NotLoaded,

    #[error("The profile is not being edited")]
    NotEditing,

    #[error("The profile is already being saved")]
    SaveInProgress,
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        let kind = match e {
            ProfileError::EmptyName | ProfileError::EmptyEmail => ErrorKind::Validation,
            ProfileError::NotLoaded | ProfileError::NotEditing | ProfileError::SaveInProgress => {
                ErrorKind::InvalidState
            }
        };
        AppError::new(kind, e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditSession {
    pub draft: ProfileDraft,
    pub saving: Option<RequestGeneration>,
    pub error: Option<AppError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ProfileStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(AppError),
    Editing(EditSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStart {
    /// `superseded` is the fetch for another user that this load replaces.
    Started {
        generation: RequestGeneration,
        superseded: Option<RequestGeneration>,
    },
    AlreadyInFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub generation: RequestGeneration,
    pub user_id: UserId,
    pub update: ProfileUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveCompletion {
    Saved(Profile),
    Failed(AppError),
    Stale,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStore {
    user_id: Option<UserId>,
    profile: Option<Profile>,
    status: ProfileStatus,
    in_flight_load: Option<RequestGeneration>,
    next_generation: u64,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn status(&self) -> &ProfileStatus {
        &self.status
    }

    pub fn draft(&self) -> Option<&ProfileDraft> {
        match &self.status {
            ProfileStatus::Editing(session) => Some(&session.draft),
            _ => None,
        }
    }

    pub fn in_flight_load(&self) -> Option<RequestGeneration> {
        self.in_flight_load
    }

    fn next_generation(&mut self) -> RequestGeneration {
        self.next_generation += 1;
        RequestGeneration(self.next_generation)
    }

    /// Starts a fetch unless one for the same user is already running.
    ///
    /// A profile cached for the same user survives a failed reload; a profile
    /// for another user is dropped immediately.
    pub fn load(&mut self, user_id: UserId) -> LoadStart {
        if self.in_flight_load.is_some() && self.user_id.as_ref() == Some(&user_id) {
            return LoadStart::AlreadyInFlight;
        }

        if self.user_id.as_ref() != Some(&user_id) {
            self.profile = None;
        }

        let generation = self.next_generation();
        let superseded = self.in_flight_load.replace(generation);
        self.user_id = Some(user_id);
        self.status = ProfileStatus::Loading;
        LoadStart::Started {
            generation,
            superseded,
        }
    }

    pub fn complete_load(
        &mut self,
        generation: RequestGeneration,
        result: Result<Profile, AppError>,
    ) -> Completion {
        if self.in_flight_load != Some(generation) {
            return Completion::Stale;
        }
        self.in_flight_load = None;

        match result {
            Ok(profile) => {
                self.profile = Some(profile);
                self.status = ProfileStatus::Loaded;
            }
            Err(error) => {
                self.status = ProfileStatus::Failed(error);
            }
        }
        Completion::Applied
    }

    pub fn begin_edit(&mut self) -> Result<&ProfileDraft, ProfileError> {
        let draft = match (&self.status, &self.profile) {
            (ProfileStatus::Loaded, Some(profile)) => ProfileDraft::from_profile(profile),
            _ => return Err(ProfileError::NotLoaded),
        };

        self.status = ProfileStatus::Editing(EditSession {
            draft,
            saving: None,
            error: None,
        });

        self.draft().ok_or(ProfileError::NotEditing)
    }

    pub fn edit_draft(&mut self, edit: impl FnOnce(&mut ProfileDraft)) -> Result<(), ProfileError> {
        match &mut self.status {
            ProfileStatus::Editing(session) => {
                edit(&mut session.draft);
                session.error = None;
                Ok(())
            }
            _ => Err(ProfileError::NotEditing),
        }
    }

    /// Validates `draft` and, when valid, reserves a generation for the PUT.
    /// An invalid draft is kept in the session with the error attached.
    pub fn save(&mut self, draft: ProfileDraft) -> Result<SaveTicket, ProfileError> {
        let user_id = self.user_id.clone().ok_or(ProfileError::NotLoaded)?;
        let generation = RequestGeneration(self.next_generation + 1);

        let ProfileStatus::Editing(session) = &mut self.status else {
            return Err(ProfileError::NotEditing);
        };

        if session.saving.is_some() {
            return Err(ProfileError::SaveInProgress);
        }

        let validated = draft.validate();
        session.draft = draft;

        match validated {
            Ok(update) => {
                session.saving = Some(generation);
                session.error = None;
                self.next_generation = generation.0;
                Ok(SaveTicket {
                    generation,
                    user_id,
                    update,
                })
            }
            Err(e) => {
                session.error = Some(e.clone().into());
                Err(e)
            }
        }
    }

    pub fn complete_save(
        &mut self,
        generation: RequestGeneration,
        result: Result<Profile, AppError>,
    ) -> SaveCompletion {
        let ProfileStatus::Editing(session) = &mut self.status else {
            return SaveCompletion::Stale;
        };

        if session.saving != Some(generation) {
            return SaveCompletion::Stale;
        }

        match result {
            Ok(profile) => {
                self.profile = Some(profile.clone());
                self.status = ProfileStatus::Loaded;
                SaveCompletion::Saved(profile)
            }
            Err(error) => {
                session.saving = None;
                session.error = Some(error.clone());
                SaveCompletion::Failed(error)
            }
        }
    }

    /// Discards the draft. Returns `false` when no edit was open.
    pub fn cancel_edit(&mut self) -> bool {
        if matches!(self.status, ProfileStatus::Editing(_)) {
            self.status = ProfileStatus::Loaded;
            true
        } else {
            false
        }
    }
}
