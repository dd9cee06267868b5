use crate::args::{AddMatchArgs, AddNoteArgs, AddProfitArgs};
use crate::commands::{Columns, Out};
use crate::model::{MatchNote, NormalNote, Profit, Record};
use crate::{Config, Result};
use anyhow::Context;
use tracing::debug;

/// Adds a deposit or withdrawal. The amount is parsed from what the user typed and stored with the
/// sign of its type.
pub async fn add_profit(config: Config, args: &AddProfitArgs) -> Result<Out<Record<Profit>>> {
    let fields = args.fields();
    let profit = Profit::parse(
        fields.kind(),
        fields.amount(),
        args.date(),
        fields.note().map(String::from),
    )?;
    add(config, profit).await
}

pub async fn add_match(config: Config, args: &AddMatchArgs) -> Result<Out<Record<MatchNote>>> {
    let fields = args.fields();
    let note = MatchNote::new(
        args.date(),
        fields.info(),
        fields.handicap().map(String::from),
    )?;
    add(config, note).await
}

pub async fn add_note(config: Config, args: &AddNoteArgs) -> Result<Out<Record<NormalNote>>> {
    let note = NormalNote::new(args.date(), args.notes())?;
    add(config, note).await
}

/// Adds `fields` as a new record and returns that record.
pub async fn add<F: Columns>(config: Config, fields: F) -> Result<Out<Record<F>>> {
    let records = config.store().add(fields).await?;
    let total = records.len();
    let record = records
        .into_iter()
        .next()
        .context("The store did not return the new record")?;
    debug!("{} now has {total} records", F::COLLECTION.key());
    Ok(Out::new(
        format!("Added record {} to {}", record.id(), F::COLLECTION),
        record,
    ))
}
