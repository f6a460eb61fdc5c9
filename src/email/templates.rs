pub fn password_reset_text(reset_url: &str) -> String {
    format!("Click here to reset your password: {reset_url}\n\nThe link works once and expires shortly. If you didn't request this, you can ignore it.\n")
}

pub fn password_reset_html(reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Reset your password</h2>
    <p>A password reset was requested for your Picturebook account.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #4f46e5; color: white; text-decoration: none; border-radius: 4px;">Click here to reset your password</a></p>
    <p style="color: #666; font-size: 14px;">The link works once and expires shortly. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}
