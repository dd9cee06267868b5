use crate::args::{UpdateMatchArgs, UpdateNoteArgs, UpdateProfitArgs};
use crate::commands::{Columns, Out};
use crate::model::{MatchNote, NormalNote, Profit, Record, RecordId};
use crate::{Config, Result};

pub async fn update_profit(
    config: Config,
    args: &UpdateProfitArgs,
) -> Result<Out<Record<Profit>>> {
    let fields = args.fields();
    let profit = Profit::parse(
        fields.kind(),
        fields.amount(),
        args.date(),
        fields.note().map(String::from),
    )?;
    update(config, args.id(), profit).await
}

pub async fn update_match(
    config: Config,
    args: &UpdateMatchArgs,
) -> Result<Out<Record<MatchNote>>> {
    let fields = args.fields();
    let note = MatchNote::new(
        args.date(),
        fields.info(),
        fields.handicap().map(String::from),
    )?;
    update(config, args.id(), note).await
}

pub async fn update_note(
    config: Config,
    args: &UpdateNoteArgs,
) -> Result<Out<Record<NormalNote>>> {
    let note = NormalNote::new(args.date(), args.notes())?;
    update(config, args.id(), note).await
}

/// Replaces every field of the record with `id`. When there is no such record nothing changes and
/// the output has no structure.
pub async fn update<F: Columns>(
    config: Config,
    id: &RecordId,
    fields: F,
) -> Result<Out<Record<F>>> {
    let records = config
        .store()
        .update(Record::new(id.clone(), fields))
        .await?;
    match records.into_iter().find(|r| r.id() == id) {
        Some(record) => Ok(Out::new(
            format!("Updated record {id} in {}", F::COLLECTION),
            record,
        )),
        None => Ok(Out::new_message(format!(
            "There is no record {id} in {}, nothing was updated",
            F::COLLECTION
        ))),
    }
}
