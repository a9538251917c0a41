//! Fixed-layout rendering of push events.

use minijinja::{Environment, context};
use serde::Serialize;

use super::{PushEvent, WebhookDomainError};

const PUSH_TEMPLATE: &str = "\
[{{ repository }}] push to {{ branch }} by {{ pusher }}
Forced push: {{ \"yes\" if forced else \"no\" }}
{% if commits %}Commits:
{% for commit in commits %}- {{ commit.summary }} ({{ commit.url }}) by {{ commit.author }}
{% endfor %}{% else %}No commits{% endif %}";

#[derive(Serialize)]
struct CommitLine<'a> {
    summary: &'a str,
    url: &'a str,
    author: &'a str,
}

/// Renders the chat message for a push event.
///
/// Commits are listed in payload order, one bullet each. An empty push
/// renders `No commits` in place of the list.
///
/// # Errors
///
/// Returns [`WebhookDomainError::Render`] if the template fails to render.
pub fn format_push(event: &PushEvent) -> Result<String, WebhookDomainError> {
    let commits: Vec<CommitLine<'_>> = event
        .commits
        .iter()
        .map(|commit| CommitLine {
            summary: commit.summary(),
            url: &commit.url,
            author: &commit.author.name,
        })
        .collect();

    let environment = Environment::new();
    let rendered = environment
        .render_str(
            PUSH_TEMPLATE,
            context! {
                repository => &event.repository.name,
                branch => event.branch(),
                pusher => &event.pusher.name,
                forced => event.forced,
                commits => commits,
            },
        )
        .map_err(|err| WebhookDomainError::Render(err.to_string()))?;
    Ok(rendered.trim_end().to_owned())
}
