use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::model::{Collection, Fields, MatchNote, NormalNote, Profit, RecordId};
use crate::{Config, Result};

/// Deletes the record with the given id from the given collection. Deleting an id that does not
/// exist succeeds and changes nothing.
pub async fn delete(config: Config, args: &DeleteArgs) -> Result<Out<()>> {
    match args.collection() {
        Collection::Profit => delete_from::<Profit>(&config, args.id()).await,
        Collection::MatchNotes => delete_from::<MatchNote>(&config, args.id()).await,
        Collection::NormalNotes => delete_from::<NormalNote>(&config, args.id()).await,
    }
}

async fn delete_from<F: Fields>(config: &Config, id: &RecordId) -> Result<Out<()>> {
    let (removed, remaining) = config.store().remove::<F>(id).await?;
    let message = match removed {
        Some(_) => format!(
            "Deleted record {id} from {}, {} records remain",
            F::COLLECTION,
            remaining.len()
        ),
        None => format!(
            "There is no record {id} in {}, nothing was deleted",
            F::COLLECTION
        ),
    };
    Ok(message.into())
}
