// saves a settlement layout as an obj file
// nodes become vertices, streets polylines and buildings flat faces

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bevy::log::{error, info};
use bevy::prelude::*;
use thiserror::Error;

use crate::systems::settlement::{SettlementCache, SettlementId, SettlementLayout, StreetKind};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write obj: {0}")]
    Io(#[from] io::Error),
    #[error("settlement {0} has not been generated")]
    UnknownSettlement(SettlementId),
}

// export event
#[derive(Event, Clone, Debug)]
pub struct ExportEvent {
    pub id: SettlementId,
    pub filename: String,
}

pub fn write_obj<W: Write>(layout: &SettlementLayout, writer: &mut W) -> Result<(), ExportError> {
    writeln!(writer, "# settlement {} (seed {})", layout.id, layout.seed)?;

    // OBJ format indices start at 1, so the node at slot i is vertex i + 1
    let mut vertex_index = Vec::with_capacity(layout.graph.next_node_id() as usize);
    let mut next_vertex = 1u32;
    for slot in 0..layout.graph.next_node_id() {
        match layout.graph.position(slot) {
            Some(p) => {
                writeln!(writer, "v {} 0 {}", p.x, p.y)?;
                vertex_index.push(Some(next_vertex));
                next_vertex += 1;
            }
            None => vertex_index.push(None),
        }
    }

    for kind in StreetKind::ALL {
        let mut wrote_header = false;
        for edge in layout.graph.edges_of_kind(kind) {
            let (Some(Some(a)), Some(Some(b))) = (vertex_index.get(edge.a as usize), vertex_index.get(edge.b as usize)) else {
                continue;
            };
            if !wrote_header {
                writeln!(writer, "o streets_{}", kind.name())?;
                wrote_header = true;
            }
            writeln!(writer, "l {} {}", a, b)?;
        }
    }

    for (n, building) in layout.buildings.iter().enumerate() {
        writeln!(writer, "o building_{}_{}", n, building.kind().name())?;
        for corner in building.footprint() {
            writeln!(writer, "v {} 0 {}", corner.x, corner.y)?;
        }
        let base = next_vertex;
        writeln!(writer, "f {} {} {} {}", base, base + 1, base + 2, base + 3)?;
        next_vertex += 4;
    }

    Ok(())
}

pub fn export_obj(layout: &SettlementLayout, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_obj(layout, &mut writer)?;
    writer.flush()?;
    Ok(())
}

// handle export events
pub fn handle_export(mut events: EventReader<ExportEvent>, cache: Res<SettlementCache>) {
    for event in events.read() {
        let result = cache
            .get(event.id)
            .ok_or(ExportError::UnknownSettlement(event.id))
            .and_then(|layout| export_obj(layout, &event.filename));

        match result {
            Ok(()) => info!("exported settlement {} to {}", event.id, event.filename),
            Err(e) => error!("export of settlement {} failed: {}", event.id, e),
        }
    }
}
