//! HTML for the verification flow.

use axum::response::Html;

use crate::utils::html_escape;

const STYLE: &str = r#"
:root{--bg:#0f172a;--fg:#e5e7eb;--muted:#9ca3af;--acc:#22c55e;--err:#ef4444}
*{box-sizing:border-box}
body{margin:0;font-family:system-ui,-apple-system,"Segoe UI",Roboto,Ubuntu,Arial;
  background:linear-gradient(160deg,#0b1020,#10172a);color:var(--fg);min-height:100vh;
  display:flex;align-items:center;justify-content:center;padding:24px}
.card{width:min(720px,100%);background:rgba(17,24,39,.85);border:1px solid rgba(255,255,255,.06);
  border-radius:16px;padding:28px;box-shadow:0 10px 40px rgba(0,0,0,.4)}
h1{font-size:20px;margin:0 0 12px}
p{line-height:1.6;color:var(--muted)}
.btn{display:inline-block;padding:12px 18px;border-radius:12px;background:var(--acc);
  color:#06110a;text-decoration:none;font-weight:600;border:0;cursor:pointer}
.error{color:var(--err);font-weight:600}
.sep{height:1px;background:rgba(255,255,255,.08);margin:18px 0}
.token-box{word-break:break-all;background:#0b1020;border:1px dashed rgba(255,255,255,.12);
  border-radius:8px;padding:8px 10px;color:#ddd;margin-top:8px;
  font-family:ui-monospace,SFMono-Regular,Menlo,monospace}
footer{margin-top:16px;font-size:12px;color:#8b96a8}
"#;

const COPY_SCRIPT: &str = r#"
function copyCmd() {
  var el = document.getElementById('cmdBox');
  var text = el ? (el.textContent || el.innerText || '') : '';
  if (!text) { alert('Nothing to copy, please reload the page.'); return; }
  if (navigator.clipboard && navigator.clipboard.writeText) {
    navigator.clipboard.writeText(text).then(
      function () { alert('Copied. Go back to Telegram, paste and send it.'); },
      function () { fallbackCopy(text); }
    );
  } else {
    fallbackCopy(text);
  }
}
function fallbackCopy(text) {
  try {
    var ta = document.createElement('textarea');
    ta.value = text;
    ta.style.position = 'fixed';
    ta.style.left = '-9999px';
    document.body.appendChild(ta);
    ta.focus();
    ta.select();
    var ok = document.execCommand('copy');
    document.body.removeChild(ta);
    if (ok) { alert('Copied. Go back to Telegram, paste and send it.'); }
    else { prompt('Copy failed, please copy manually:', text); }
  } catch (e) {
    prompt('Copy failed, please copy manually:', text);
  }
}
"#;

fn shell(title: &str, body: &str, load_recaptcha_js: bool) -> Html<String> {
    let recaptcha = if load_recaptcha_js {
        r#"<script src="https://www.google.com/recaptcha/api.js" async defer></script>"#
    } else {
        ""
    };
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>{STYLE}</style>
</head>
<body>
  <div class="card">
    {body}
    <footer>Powered by reCAPTCHA.</footer>
  </div>
  {recaptcha}
</body>
</html>"#,
        title = html_escape(title),
    ))
}

pub fn error_page(message: &str) -> Html<String> {
    let body = format!(
        r#"<h1>⚠️ Verification error</h1>
<p class="error">{}</p>
<div class="sep"></div>
<p>Go back to Telegram, request a new verification link and try again.</p>"#,
        html_escape(message)
    );
    shell("Verification error", &body, false)
}

pub fn captcha_form(site_key: &str, verify_token: &str) -> Html<String> {
    let body = format!(
        r#"<h1>🤖 Human verification</h1>
<p>Complete the CAPTCHA below to continue talking to the bot.</p>
<div class="sep"></div>
<form method="post" action="" autocomplete="off">
  <input type="hidden" name="verify_token" value="{token}">
  <div class="g-recaptcha" data-sitekey="{site_key}"></div>
  <div style="height:14px"></div>
  <button type="submit" class="btn">Verify and continue</button>
</form>"#,
        token = html_escape(verify_token),
        site_key = html_escape(site_key),
    );
    shell("Human verification", &body, true)
}

pub fn success_page(bot_username: &str, success_token: &str) -> Html<String> {
    let command = format!("/start {success_token}");
    let body = format!(
        r#"<h1>✅ Verification passed</h1>
<p>Use the button below to copy the command, then switch back to your chat with
<b>@{username}</b> in Telegram, <b>paste and send</b> it to finish.</p>
<div class="token-box" id="cmdBox">{command}</div>
<div style="height:12px"></div>
<button class="btn" type="button" onclick="copyCmd()">Copy command</button>
<script>{COPY_SCRIPT}</script>"#,
        username = html_escape(bot_username),
        command = html_escape(&command),
    );
    shell("Verification passed", &body, false)
}
