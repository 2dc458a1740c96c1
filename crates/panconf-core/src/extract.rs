// ── Extraction engine ──
//
// Walks the device object tree for one schema entry, depth-first:
// fetch → normalize → recurse into declared children → order.
// Any failure in the subtree fails the whole top-level entry.

use futures_util::future::BoxFuture;
use tracing::{debug, error, trace};

use crate::context::HostContext;
use crate::device::{DeviceClient, Instance, Parent};
use crate::error::ExtractError;
use crate::normalize::normalize;
use crate::order::order;
use crate::record::Record;
use crate::schema::SchemaEntry;

/// Extract every instance of a top-level entry from the host.
///
/// A skipped entry returns an empty list without touching the device.
pub async fn extract<C: DeviceClient>(
    ctx: &HostContext<C>,
    entry: &SchemaEntry,
) -> Result<Vec<Record>, ExtractError> {
    if entry.skip {
        trace!(object_type = %entry.name, "skipped");
        return Ok(Vec::new());
    }

    let relation = entry.parent_relation.as_deref().unwrap_or_default();
    let container = ctx
        .resolve(relation)
        .ok_or_else(|| ExtractError::ParentUnresolved {
            object_type: entry.name.clone(),
            relation: relation.to_owned(),
        })?;

    let records = extract_from(ctx, entry, Parent::Container(container)).await?;
    debug!(
        host = %ctx.host,
        vsys = %ctx.vsys,
        object_type = %entry.name,
        count = records.len(),
        "extracted"
    );
    Ok(records)
}

fn extract_from<'a, C: DeviceClient>(
    ctx: &'a HostContext<C>,
    entry: &'a SchemaEntry,
    parent: Parent<'a>,
) -> BoxFuture<'a, Result<Vec<Record>, ExtractError>> {
    Box::pin(async move {
        if entry.skip {
            return Ok(Vec::new());
        }

        let instances = ctx
            .client
            .fetch_children(parent, entry.descriptor)
            .await
            .map_err(|source| ExtractError::Fetch {
                object_type: entry.name.clone(),
                source,
            })?;

        let mut records = Vec::with_capacity(instances.len());
        for instance in &instances {
            let mut record = normalize(instance, &entry.fields, ctx.drop_absent);
            attach_children(ctx, entry, instance, &mut record).await?;
            records.push(record);
        }

        order(records, &entry.sort_key).map_err(|missing| {
            error!(
                host = %ctx.host,
                vsys = %ctx.vsys,
                object_type = %entry.name,
                key = %missing.0,
                "record is missing its sort key; check the schema params"
            );
            ExtractError::SortKeyMissing {
                object_type: entry.name.clone(),
                key: missing.0,
            }
        })
    })
}

async fn attach_children<C: DeviceClient>(
    ctx: &HostContext<C>,
    entry: &SchemaEntry,
    instance: &Instance,
    record: &mut Record,
) -> Result<(), ExtractError> {
    if instance.children().is_empty() || entry.children.is_empty() {
        return Ok(());
    }

    for child in &entry.children {
        let child_records = extract_from(ctx, child, Parent::Instance(instance)).await?;
        if !child_records.is_empty() {
            record.insert_children(child.name.as_str(), child_records);
        }
    }
    Ok(())
}
