use anyhow::Result;

use crate::model::User;

fn avatar_summary(avatar: Option<&str>) -> String {
    match avatar {
        None => "none".to_string(),
        Some(url) => {
            let mime = url
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .unwrap_or("unknown");
            format!("{mime}, {} bytes encoded", url.len())
        }
    }
}

fn lines(user: &User) -> Vec<(&'static str, String)> {
    vec![
        ("id", user.id.to_string()),
        ("username", user.username.clone()),
        ("email", user.email.clone()),
        ("phone", user.phone.clone()),
        ("birth date", user.birth_date.format("%Y-%m-%d").to_string()),
        (
            "country",
            format!("{} ({})", user.country, user.country.phone_code),
        ),
        (
            "website",
            if user.website.is_empty() {
                "-".to_string()
            } else {
                user.website.clone()
            },
        ),
        ("avatar", avatar_summary(user.avatar.as_deref())),
        (
            "verified",
            if user.is_verified { "yes" } else { "no" }.to_string(),
        ),
        ("verify via", user.verification_method.to_string()),
        ("member since", user.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ("updated", user.updated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
    ]
}

pub(crate) fn user_text(user: &User) -> String {
    let entries = lines(user);
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|(key, value)| format!("  {key:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print `user` either as aligned text or as pretty JSON.
pub(crate) fn print_user(user: &User, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("{}", user_text(user));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::registration;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_user_text_lists_profile_fields() {
        let user = User::from_registration(Uuid::nil(), registration("alice", "a@x.io"), Utc::now());
        let text = user_text(&user);
        assert!(text.contains("username"));
        assert!(text.contains("alice"));
        assert!(text.contains("Germany (+49)"));
        assert!(text.contains("verified      no"));
    }

    #[test]
    fn test_avatar_summary() {
        assert_eq!(avatar_summary(None), "none");
        assert_eq!(
            avatar_summary(Some("data:image/png;base64,AA==")),
            "image/png, 26 bytes encoded"
        );
    }
}
