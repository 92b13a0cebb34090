//! Request pipeline
//!
//! Every catalog entity goes through the same request shapes: list, detail,
//! create, update and delete. The shapes are written once here, generic over
//! [`Resource`]; each entity supplies its data access, view names and form
//! rules through a `Resource` implementation in `services`.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    fetch::ParallelFetch,
    validation::{FormFields, ValidationReport},
    views::{Outcome, View},
};

/// Template names, titles and data bag keys of one resource
#[derive(Debug, Clone, Copy)]
pub struct ResourceViews {
    /// Display noun, e.g. "Author"
    pub noun: &'static str,
    pub list_url: &'static str,
    pub list_template: &'static str,
    pub list_title: &'static str,
    pub list_key: &'static str,
    pub detail_template: &'static str,
    /// Key of the record in detail, form and delete views
    pub record_key: &'static str,
    /// Key of the dependent records, when the resource has any
    pub related_key: Option<&'static str>,
    pub form_template: &'static str,
    pub create_title: &'static str,
    pub update_title: &'static str,
    pub delete_template: &'static str,
    pub delete_title: &'static str,
}

/// Outcome of checking one form submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<C> {
    Accepted(C),
    /// The candidate is kept so the form can be shown back as submitted
    Rejected(C, ValidationReport),
}

impl<C> Submission<C> {
    pub fn new(candidate: C, report: ValidationReport) -> Self {
        if report.is_empty() {
            Submission::Accepted(candidate)
        } else {
            Submission::Rejected(candidate, report)
        }
    }
}

/// A catalog entity the pipeline can list, show, create and delete
#[async_trait]
pub trait Resource: Send + Sync {
    /// Row of the list view
    type Summary: Serialize + Send;
    /// Record shown by the detail and delete views
    type Record: Serialize + Send + 'static;
    /// Records that reference this one
    type Related: Serialize + Send + 'static;
    /// Reference data a form needs
    type Options: Send + 'static;
    /// Sanitized submission
    type Candidate: Serialize + Send + Sync + 'static;

    const VIEWS: ResourceViews;

    async fn list(&self) -> AppResult<Vec<Self::Summary>>;

    async fn find(&self, id: Uuid) -> AppResult<Option<Self::Record>>;

    async fn related(&self, id: Uuid) -> AppResult<Self::Related>;

    /// Whether `related` blocks deletion
    fn has_dependents(related: &Self::Related) -> bool;

    fn detail_title(_record: &Self::Record) -> String {
        format!("{} Detail", Self::VIEWS.noun)
    }

    async fn options(&self) -> AppResult<Self::Options>;

    /// Fill a form view with its options and, when re-rendering, the candidate
    fn form_view(
        &self,
        view: View,
        options: Self::Options,
        candidate: Option<&Self::Candidate>,
    ) -> AppResult<View>;

    /// Validate and sanitize a submission
    fn check(&self, form: &FormFields) -> Submission<Self::Candidate>;

    /// Persist an accepted candidate; returns the URL to redirect to
    async fn insert(&self, candidate: Self::Candidate) -> AppResult<String>;

    async fn remove(&self, id: Uuid) -> AppResult<()>;
}

/// A resource whose records can be replaced through the update form
#[async_trait]
pub trait Editable: Resource {
    /// Current record as a form candidate
    async fn load(&self, id: Uuid) -> AppResult<Option<Self::Candidate>>;

    /// Replace the record; `None` when it no longer exists
    async fn replace(&self, id: Uuid, candidate: Self::Candidate) -> AppResult<Option<String>>;
}

fn not_found<R: Resource>() -> AppError {
    AppError::NotFound(format!("{} not found", R::VIEWS.noun))
}

/// List view of every record
pub async fn list<R: Resource>(resource: &R) -> AppResult<Outcome> {
    let views = R::VIEWS;
    let records = resource.list().await?;
    let view = View::new(views.list_template, views.list_title).with(views.list_key, records)?;
    Ok(Outcome::Render(view))
}

/// Detail view of one record and its dependents
pub async fn detail<R: Resource>(resource: &R, id: Uuid) -> AppResult<Outcome> {
    let views = R::VIEWS;
    let mut fetched = ParallelFetch::new()
        .add("record", resource.find(id))
        .add("related", resource.related(id))
        .run()
        .await?;

    let record: R::Record = fetched
        .take::<Option<R::Record>>("record")?
        .ok_or_else(not_found::<R>)?;
    let related: R::Related = fetched.take("related")?;

    let mut view = View::new(views.detail_template, R::detail_title(&record));
    if let Some(key) = views.related_key {
        view = view.with(key, related)?;
    }
    Ok(Outcome::Render(view.with(views.record_key, record)?))
}

/// Empty create form
pub async fn create_form<R: Resource>(resource: &R) -> AppResult<Outcome> {
    let views = R::VIEWS;
    let options = resource.options().await?;
    let view = resource.form_view(View::new(views.form_template, views.create_title), options, None)?;
    Ok(Outcome::Render(view))
}

async fn rejected_form<R: Resource>(
    resource: &R,
    title: &'static str,
    candidate: &R::Candidate,
    report: &ValidationReport,
) -> AppResult<Outcome> {
    tracing::debug!(resource = R::VIEWS.noun, violations = report.len(), "Submission rejected");
    let options = resource.options().await?;
    let view = resource
        .form_view(View::new(R::VIEWS.form_template, title), options, Some(candidate))?
        .with("errors", report)?;
    Ok(Outcome::Render(view))
}

/// Create submission: re-render with violations, or persist and redirect
pub async fn create<R: Resource>(resource: &R, form: &FormFields) -> AppResult<Outcome> {
    match resource.check(form) {
        Submission::Rejected(candidate, report) => {
            rejected_form(resource, R::VIEWS.create_title, &candidate, &report).await
        }
        Submission::Accepted(candidate) => {
            let url = resource.insert(candidate).await?;
            tracing::info!(resource = R::VIEWS.noun, url = %url, "Record created");
            Ok(Outcome::Redirect(url))
        }
    }
}

/// Update form pre-filled with the current record
pub async fn update_form<R: Editable>(resource: &R, id: Uuid) -> AppResult<Outcome> {
    let views = R::VIEWS;
    let mut fetched = ParallelFetch::new()
        .add("record", resource.load(id))
        .add("options", resource.options())
        .run()
        .await?;

    let candidate: R::Candidate = fetched
        .take::<Option<R::Candidate>>("record")?
        .ok_or_else(not_found::<R>)?;
    let options: R::Options = fetched.take("options")?;

    let view = resource.form_view(
        View::new(views.form_template, views.update_title),
        options,
        Some(&candidate),
    )?;
    Ok(Outcome::Render(view))
}

/// Update submission. Re-rendering and persisting are mutually exclusive.
pub async fn update<R: Editable>(resource: &R, id: Uuid, form: &FormFields) -> AppResult<Outcome> {
    match resource.check(form) {
        Submission::Rejected(candidate, report) => {
            rejected_form(resource, R::VIEWS.update_title, &candidate, &report).await
        }
        Submission::Accepted(candidate) => {
            let url = resource.replace(id, candidate).await?.ok_or_else(not_found::<R>)?;
            tracing::info!(resource = R::VIEWS.noun, url = %url, "Record updated");
            Ok(Outcome::Redirect(url))
        }
    }
}

struct DeleteCheck<R: Resource> {
    record: Option<R::Record>,
    related: R::Related,
}

async fn delete_check<R: Resource>(resource: &R, id: Uuid) -> AppResult<DeleteCheck<R>> {
    let mut fetched = ParallelFetch::new()
        .add("record", resource.find(id))
        .add("related", resource.related(id))
        .run()
        .await?;

    Ok(DeleteCheck {
        record: fetched.take("record")?,
        related: fetched.take("related")?,
    })
}

fn delete_view<R: Resource>(record: R::Record, related: R::Related) -> AppResult<Outcome> {
    let views = R::VIEWS;
    let mut view = View::new(views.delete_template, views.delete_title).with(views.record_key, record)?;
    if let Some(key) = views.related_key {
        view = view.with(key, related)?;
    }
    Ok(Outcome::Render(view))
}

/// Delete confirmation. Never writes.
pub async fn delete_form<R: Resource>(resource: &R, id: Uuid) -> AppResult<Outcome> {
    let check = delete_check(resource, id).await?;
    match check.record {
        None => Ok(Outcome::Redirect(R::VIEWS.list_url.to_string())),
        Some(record) => delete_view::<R>(record, check.related),
    }
}

/// Delete submission, blocked while dependent records exist
pub async fn delete<R: Resource>(resource: &R, id: Uuid) -> AppResult<Outcome> {
    let check = delete_check(resource, id).await?;
    let Some(record) = check.record else {
        return Ok(Outcome::Redirect(R::VIEWS.list_url.to_string()));
    };

    if R::has_dependents(&check.related) {
        tracing::debug!(resource = R::VIEWS.noun, %id, "Delete blocked by dependent records");
        return delete_view::<R>(record, check.related);
    }

    resource.remove(id).await?;
    tracing::info!(resource = R::VIEWS.noun, %id, "Record deleted");
    Ok(Outcome::Redirect(R::VIEWS.list_url.to_string()))
}

/// Endpoint with no behavior yet
pub fn not_supported(what: &str) -> Outcome {
    Outcome::NotSupported(what.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FormInput;
    use std::sync::Mutex;
    use validator::Validate;

    #[derive(Validate)]
    struct NameForm {
        #[validate(length(min = 1, message = "Name required"))]
        name: String,
    }

    impl FormInput for NameForm {
        const FIELDS: &'static [&'static str] = &["name"];

        fn from_fields(fields: &FormFields) -> Self {
            Self {
                name: fields.text("name"),
            }
        }
    }

    /// Minimal resource over a vector of names
    #[derive(Default)]
    struct Names {
        names: Mutex<Vec<(Uuid, String)>>,
        dependents: Vec<String>,
        fail_related: bool,
    }

    #[async_trait]
    impl Resource for Names {
        type Summary = String;
        type Record = String;
        type Related = Vec<String>;
        type Options = Vec<&'static str>;
        type Candidate = String;

        const VIEWS: ResourceViews = ResourceViews {
            noun: "Name",
            list_url: "/names",
            list_template: "name_list",
            list_title: "Name List",
            list_key: "name_list",
            detail_template: "name_detail",
            record_key: "name",
            related_key: Some("name_refs"),
            form_template: "name_form",
            create_title: "Create Name",
            update_title: "Update Name",
            delete_template: "name_delete",
            delete_title: "Delete Name",
        };

        async fn list(&self) -> AppResult<Vec<String>> {
            Ok(self.names.lock().unwrap().iter().map(|(_, n)| n.clone()).collect())
        }

        async fn find(&self, id: Uuid) -> AppResult<Option<String>> {
            Ok(self
                .names
                .lock()
                .unwrap()
                .iter()
                .find(|(i, _)| *i == id)
                .map(|(_, n)| n.clone()))
        }

        async fn related(&self, _id: Uuid) -> AppResult<Vec<String>> {
            if self.fail_related {
                return Err(AppError::Internal("store down".to_string()));
            }
            Ok(self.dependents.clone())
        }

        fn has_dependents(related: &Vec<String>) -> bool {
            !related.is_empty()
        }

        async fn options(&self) -> AppResult<Vec<&'static str>> {
            Ok(vec!["a", "b"])
        }

        fn form_view(&self, view: View, options: Vec<&'static str>, candidate: Option<&String>) -> AppResult<View> {
            let view = view.with("options", options)?;
            match candidate {
                Some(name) => view.with("name", name),
                None => Ok(view),
            }
        }

        fn check(&self, form: &FormFields) -> Submission<String> {
            let form = NameForm::from_fields(form);
            let report = form.report();
            Submission::new(form.name, report)
        }

        async fn insert(&self, candidate: String) -> AppResult<String> {
            let id = Uuid::new_v4();
            self.names.lock().unwrap().push((id, candidate));
            Ok(format!("/name/{}", id))
        }

        async fn remove(&self, id: Uuid) -> AppResult<()> {
            self.names.lock().unwrap().retain(|(i, _)| *i != id);
            Ok(())
        }
    }

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[tokio::test]
    async fn test_create_rejected_keeps_input_and_writes_nothing() {
        let names = Names::default();
        let outcome = create(&names, &form(&[("name", "   ")])).await.unwrap();

        let view = outcome.view().unwrap();
        assert_eq!(view.template, "name_form");
        assert_eq!(view.get("errors").unwrap()[0]["message"], "Name required");
        assert_eq!(view.get("options").unwrap(), &serde_json::json!(["a", "b"]));
        assert!(names.names.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_accepted_redirects() {
        let names = Names::default();
        let outcome = create(&names, &form(&[("name", " Ada ")])).await.unwrap();

        let stored = names.names.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1, "Ada");
        assert_eq!(outcome.redirect_target(), Some(format!("/name/{}", stored[0].0).as_str()));
    }

    #[tokio::test]
    async fn test_detail_missing_is_not_found() {
        let result = detail(&Names::default(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_fetch_failure_propagates() {
        let names = Names {
            fail_related: true,
            ..Default::default()
        };
        let result = detail(&names, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_delete_blocked_then_allowed() {
        let id = Uuid::new_v4();
        let blocked = Names {
            names: Mutex::new(vec![(id, "Ada".to_string())]),
            dependents: vec!["ref".to_string()],
            fail_related: false,
        };
        let outcome = delete(&blocked, id).await.unwrap();
        assert_eq!(outcome.view().unwrap().template, "name_delete");
        assert_eq!(blocked.names.lock().unwrap().len(), 1);

        let free = Names {
            names: Mutex::new(vec![(id, "Ada".to_string())]),
            ..Default::default()
        };
        let outcome = delete(&free, id).await.unwrap();
        assert_eq!(outcome.redirect_target(), Some("/names"));
        assert!(free.names.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_form_of_missing_record_redirects_to_list() {
        let outcome = delete_form(&Names::default(), Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome.redirect_target(), Some("/names"));
    }

    #[test]
    fn test_submission_new() {
        assert_eq!(Submission::new(1, ValidationReport::default()), Submission::Accepted(1));
    }
}
