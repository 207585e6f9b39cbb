use axum::Extension;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use authgate_db::Session;

use crate::gate::get_session;
use crate::state::SharedState;

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title>\
         <link rel=\"stylesheet\" href=\"/static/app.css\"></head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

/// GET / (session required).
pub async fn home(Extension(session): Extension<Session>) -> Html<String> {
    let body = format!(
        "<header><span>{name}</span> <small>{email}</small></header>\n\
         <main><h1>Auth POC</h1><p>Signed in as {email}.</p></main>",
        name = escape_html(&session.user.name),
        email = escape_html(&session.user.email),
    );
    layout("Auth POC", &body)
}

/// GET /login: sign-in form, or back home when already signed in.
pub async fn login(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if get_session(&state, &headers).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let action = format!("{}/sign-in/email", state.config.auth.base_path);
    let body = format!(
        "<main><h1>Sign in</h1>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <label>Email <input name=\"email\" type=\"email\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Sign in</button>\n\
         </form>\n<p>No account? <a href=\"/register\">Register</a></p></main>",
        action = escape_html(&action),
    );
    layout("Sign in", &body).into_response()
}

/// GET /register: sign-up form, or back home when already signed in.
pub async fn register(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if get_session(&state, &headers).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let action = format!("{}/sign-up/email", state.config.auth.base_path);
    let body = format!(
        "<main><h1>Register</h1>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <label>Name <input name=\"name\" required></label>\n\
         <label>Email <input name=\"email\" type=\"email\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" minlength=\"8\" required></label>\n\
         <button type=\"submit\">Register</button>\n\
         </form>\n<p>Already registered? <a href=\"/login\">Sign in</a></p></main>",
        action = escape_html(&action),
    );
    layout("Register", &body).into_response()
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html("<b>\"Ada\" & 'co'</b>"),
            "&lt;b&gt;&quot;Ada&quot; &amp; &#39;co&#39;&lt;/b&gt;"
        );
    }
}
