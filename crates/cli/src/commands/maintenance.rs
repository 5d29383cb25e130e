//! Maintenance mode commands.
//!
//! These write shared storage directly, as an operator; no admin login is
//! involved. Open tabs pick the change up through their gate.

use askama::Template;
use sinertis_site::admin::MaintenanceStatus;
use sinertis_site::error::AppError;
use sinertis_site::maintenance::MaintenanceOverlay;

/// Print the current maintenance state.
///
/// # Errors
///
/// Returns an error if configuration or storage cannot be loaded.
pub fn status() -> Result<(), AppError> {
    let status = super::control()?.status();
    print_status(&status);
    Ok(())
}

/// Turn maintenance mode on.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn enable(message: Option<&str>) -> Result<(), AppError> {
    let control = super::control()?;
    control.set_maintenance(true, message)?;
    print_status(&control.status());
    Ok(())
}

/// Turn maintenance mode off.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn disable() -> Result<(), AppError> {
    let control = super::control()?;
    control.set_maintenance(false, None)?;
    print_status(&control.status());
    Ok(())
}

/// Print the overlay markup built from current storage.
///
/// # Errors
///
/// Returns an error if storage cannot be read or the template fails.
pub fn preview() -> Result<(), AppError> {
    let tab = super::open_tab()?;
    let html = MaintenanceOverlay::from_storage(&tab).render()?;
    #[allow(clippy::print_stdout)]
    {
        println!("{html}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_status(status: &MaintenanceStatus) {
    println!("Maintenance: {}", status.flag);
    println!(
        "Message:     {}",
        status.message.as_deref().unwrap_or("(default)")
    );
    println!(
        "Toggled at:  {}",
        status.toggled_at.as_deref().unwrap_or("never")
    );
    println!("YouTube:     {}", status.settings.youtube_url);
    println!("Discord:     {}", status.settings.discord_url);
}
