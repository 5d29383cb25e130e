//! Site settings commands.

use sinertis_site::error::AppError;

/// Print the current settings.
///
/// # Errors
///
/// Returns an error if storage cannot be loaded.
pub fn show() -> Result<(), AppError> {
    let settings = super::control()?.status().settings;
    #[allow(clippy::print_stdout)]
    {
        println!("YouTube: {}", settings.youtube_url);
        println!("Discord: {}", settings.discord_url);
    }
    Ok(())
}

/// Update the given settings, keeping the others.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn set(youtube: Option<String>, discord: Option<String>) -> Result<(), AppError> {
    let control = super::control()?;
    let mut settings = control.status().settings;
    if let Some(url) = youtube {
        settings.youtube_url = url;
    }
    if let Some(url) = discord {
        settings.discord_url = url;
    }
    control.update_settings(&settings)?;
    tracing::info!("Settings saved");
    Ok(())
}
