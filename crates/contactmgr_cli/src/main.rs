//! Contact manager demonstration driver.
//!
//! # Responsibility
//! - Exercise the contact store top to bottom once: save, list, update,
//!   delete, printing each stage to stdout.
//! - Own process bootstrap: config, logging, session factory lifetime.

use contactmgr_core::{
    core_version, init_logging, AppConfig, ContactBuilder, ContactRepository, ContactService,
    SessionFactory, SqliteContactRepository,
};
use log::info;
use std::error::Error;
use std::io::{self, Write};

fn main() {
    if let Err(err) = run() {
        eprintln!("contactmgr: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;
    info!(
        "event=cli_start module=cli status=ok version={} persistent={}",
        core_version(),
        config.db_path.is_some()
    );

    let factory = SessionFactory::from_config(&config)?;
    {
        let service = ContactService::new(SqliteContactRepository::new(&factory));
        let stdout = io::stdout();
        run_demo(&service, &mut stdout.lock())?;
    }
    factory.close()?;

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

/// Runs the save/update/delete walkthrough against `service`.
fn run_demo<R, W>(service: &ContactService<R>, out: &mut W) -> Result<(), Box<dyn Error>>
where
    R: ContactRepository,
    W: Write,
{
    let mut contact = ContactBuilder::new("Chris", "Ramacciotti")?
        .with_email("rama@teamtreehouse.com")
        .with_phone(7_735_556_666)
        .build();
    let id = service.save(&mut contact)?;

    banner(out, "Before update")?;
    print_all(service, out)?;

    if let Some(mut saved) = service.find_by_id(id)? {
        saved.set_first_name("Mike")?;
        banner(out, "Updating...")?;
        service.update(&saved)?;
        banner(out, "Update Complete!")?;
        print_all(service, out)?;
    }

    banner(out, "Deleting...")?;
    service.delete_by_id(id)?;
    banner(out, "Deleted!")?;

    banner(out, "After delete")?;
    print_all(service, out)?;
    Ok(())
}

fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    write!(out, "\n\n{title}\n\n")
}

fn print_all<R, W>(service: &ContactService<R>, out: &mut W) -> Result<(), Box<dyn Error>>
where
    R: ContactRepository,
    W: Write,
{
    for contact in service.fetch_all()? {
        writeln!(out, "{contact}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_demo;
    use contactmgr_core::{ContactService, SessionFactory, SqliteContactRepository};

    #[test]
    fn demo_prints_each_stage_and_leaves_store_empty() {
        let factory = SessionFactory::open_in_memory().unwrap();
        let service = ContactService::new(SqliteContactRepository::new(&factory));
        let mut out = Vec::new();

        run_demo(&service, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let before = text.find("Before update").unwrap();
        let complete = text.find("Update Complete!").unwrap();
        let deleted = text.find("Deleted!").unwrap();
        let after = text.find("After delete").unwrap();
        assert!(before < complete && complete < deleted && deleted < after);

        assert!(text[before..complete].contains("firstName='Chris', lastName='Ramacciotti'"));
        assert!(text[complete..deleted].contains("id=1, firstName='Mike'"));
        assert!(!text[after..].contains("Contact{"));
        assert!(service.fetch_all().unwrap().is_empty());
    }
}
