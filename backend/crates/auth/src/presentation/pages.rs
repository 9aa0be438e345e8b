//! Fixed HTML pages

pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Secrets</title></head>
<body>
  <h1>Secrets</h1>
  <p>Don't keep your secrets, share them anonymously!</p>
  <a href="/register">Register</a>
  <a href="/login">Login</a>
</body>
</html>
"#;

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Login</title></head>
<body>
  <h1>Login</h1>
  <form action="/login" method="POST">
    <label for="username">Email</label>
    <input type="email" id="username" name="username">
    <label for="password">Password</label>
    <input type="password" id="password" name="password">
    <button type="submit">Login</button>
  </form>
</body>
</html>
"#;

pub const REGISTER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Register</title></head>
<body>
  <h1>Register</h1>
  <form action="/register" method="POST">
    <label for="username">Email</label>
    <input type="email" id="username" name="username">
    <label for="password">Password</label>
    <input type="password" id="password" name="password">
    <button type="submit">Register</button>
  </form>
</body>
</html>
"#;

pub const SECRETS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Secrets</title></head>
<body>
  <h1>You've Discovered My Secret!</h1>
  <p>Jack Bauer is my hero.</p>
  <a href="/logout">Log Out</a>
</body>
</html>
"#;
