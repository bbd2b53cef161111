//! Minimal HTML rendering for the login page and dashboard.
//!
//! View plumbing only; no decision logic lives here.

use crate::auth::{permissions_for, Role};

pub fn login_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>glowd</title></head>
<body>
  <h1>glowd</h1>
  <form method="post" action="/login">
    <label>Username <input name="username"></label>
    <label>Password <input name="password" type="password"></label>
    <button type="submit">Log in</button>
  </form>
</body>
</html>
"#
    .to_string()
}

pub fn dashboard_page(username: &str, role: Role) -> String {
    let perms = permissions_for(role);
    let controls = if perms.can_control_led {
        r#"<p><a href="/led/on">On</a> <a href="/led/off">Off</a>
 <a href="/led/red">Red</a> <a href="/led/green">Green</a> <a href="/led/blue">Blue</a>
 <a href="/led/white">White</a> <a href="/led/yellow">Yellow</a>
 <a href="/led/cyan">Cyan</a> <a href="/led/magenta">Magenta</a></p>"#
    } else {
        "<p>Read-only access.</p>"
    };
    let logs = if perms.can_view_log {
        r#"<p><a href="/logs">Activity log</a></p>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>glowd dashboard</title></head>
<body>
  <h1>glowd dashboard</h1>
  <p>Signed in as <b>{username}</b> ({role})</p>
  {controls}
  {logs}
  <p><a href="/status">Status</a> | <a href="/logout">Log out</a></p>
</body>
</html>
"#
    )
}
