//! Read-only commands: show, active, voters, total.

pub async fn show(id: u64, config: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (_db, ledger) = super::open_ledger(&config).await?;

    let view = ledger.get_proposal(id)?;
    println!("Proposal #{}: {}", view.id, view.title);
    if !view.description.is_empty() {
        println!("  {}", view.description);
    }
    println!("  size: {} m²", view.size);
    if !view.discussion_ref.is_empty() {
        println!("  discussion: {}", view.discussion_ref);
    }
    println!("  creator: {}", view.creator);
    println!("  yes {} / no {}", view.yes_count, view.no_count);
    println!(
        "  deadline: unix {} ({})",
        view.deadline,
        if view.active { "open" } else { "closed" }
    );
    Ok(())
}

pub async fn active(config: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (_db, ledger) = super::open_ledger(&config).await?;

    let ids = ledger.active_proposals();
    if ids.is_empty() {
        println!("No proposals are open for voting.");
        return Ok(());
    }
    for id in ids {
        let view = ledger.get_proposal(id)?;
        println!(
            "#{} {} (yes {} / no {}, closes at unix {})",
            view.id, view.title, view.yes_count, view.no_count, view.deadline
        );
    }
    Ok(())
}

pub async fn voters(id: u64, config: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (_db, ledger) = super::open_ledger(&config).await?;

    // Empty output (not an error) when nobody voted yet.
    for voter in ledger.get_voters(id) {
        println!("{}", voter);
    }
    Ok(())
}

pub async fn total(config: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let (_db, ledger) = super::open_ledger(&config).await?;

    println!("{}", ledger.total_proposals());
    Ok(())
}
