use serde_json::Value;

use crate::error::Result;
use crate::geometry::{Direction, Position, Size, Turn};
use crate::grid::{GridError, GridView, LayerKind, LayerLayout, LayerRef};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{MapMetrics, MetricSnapshot};
use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::rotation::RotationEngine;
use crate::store::PersistenceError;

use super::config::MapConfig;
use super::tile::{EMPTY, EditZone, SOLID, Tile, TileMut, wall_cell};

const LOG_TARGET: &str = "wall_grid::map";

/// Floor, horizontal-wall and vertical-wall layers packed into one buffer.
///
/// The buffer is allocated once and never resized. Every successful mutation
/// raises exactly one change signal, delivered synchronously to subscribers
/// before the call returns; a rejected mutation raises nothing and leaves the
/// buffer untouched.
#[derive(Debug)]
pub struct LayeredMap {
    buffer: Vec<u8>,
    layout: LayerLayout,
    direction: Direction,
    notifier: ChangeNotifier<LayeredMap>,
    metrics: MapMetrics,
    logger: Option<Logger>,
}

impl LayeredMap {
    /// Build a map with walls solid and floor empty.
    pub fn new(size: Size) -> Result<Self> {
        Self::with_config(&MapConfig::new(size.width, size.height))
    }

    pub fn with_config(config: &MapConfig) -> Result<Self> {
        config.validate()?;
        let layout = LayerLayout::for_size(config.size())?;

        let mut buffer = vec![0u8; layout.total_len()];
        layout.floor().fill(&mut buffer, config.initial_floor)?;
        layout.wall_h().fill(&mut buffer, config.initial_wall)?;
        layout.wall_v().fill(&mut buffer, config.initial_wall)?;

        Ok(Self {
            buffer,
            layout,
            direction: Direction::North,
            notifier: ChangeNotifier::new(),
            metrics: MapMetrics::new(),
            logger: None,
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn size(&self) -> Size {
        self.layout.size()
    }

    pub fn width(&self) -> u32 {
        self.layout.floor().width()
    }

    pub fn height(&self) -> u32 {
        self.layout.floor().height()
    }

    /// Cumulative rotation, starting at north.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn layout(&self) -> &LayerLayout {
        &self.layout
    }

    pub fn view(&self, layer: LayerKind) -> GridView {
        self.layout.view(layer)
    }

    pub fn layer(&self, layer: LayerKind) -> LayerRef<'_> {
        LayerRef::new_unchecked(self.layout.view(layer), &self.buffer)
    }

    /// The whole backing buffer in current layer order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn content_hash(&self) -> blake3::Hash {
        blake3::hash(&self.buffer)
    }

    pub fn metrics(&self) -> MetricSnapshot {
        self.metrics.snapshot()
    }

    /// Emit the current counters as one `map_metrics` event.
    pub fn log_metrics(&self) {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(self.metrics.snapshot().to_log_event(LOG_TARGET));
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LayeredMap) + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Number of change signals raised so far.
    pub fn revision(&self) -> u64 {
        self.notifier.revision()
    }

    pub fn is_dirty(&self) -> bool {
        self.notifier.is_dirty()
    }

    /// For render loops that poll instead of subscribing.
    pub fn take_dirty(&mut self) -> bool {
        self.notifier.take_dirty()
    }

    pub fn cell(&self, layer: LayerKind, x: u32, y: u32) -> Result<u8> {
        Ok(self.layout.view(layer).get(&self.buffer, x, y)?)
    }

    pub fn set_cell(&mut self, layer: LayerKind, x: u32, y: u32, value: u8) -> Result<()> {
        let view = self.layout.view(layer);
        let outcome = view.set(&mut self.buffer, x, y, value);
        self.finish_write(outcome)
    }

    /// Overwrite every cell of one layer with a single signal.
    pub fn fill(&mut self, layer: LayerKind, value: u8) -> Result<()> {
        let view = self.layout.view(layer);
        let outcome = view.fill(&mut self.buffer, value);
        self.finish_write(outcome)
    }

    pub fn wall_at(&self, x: u32, y: u32, direction: Direction) -> Result<u8> {
        let (layer, wx, wy) = self.wall_cell_checked(x, y, direction)?;
        self.cell(layer, wx, wy)
    }

    /// Writes the shared cell, so the neighbour's facing wall changes with it.
    pub fn set_wall_at(&mut self, x: u32, y: u32, direction: Direction, value: u8) -> Result<()> {
        let (layer, wx, wy) = match self.wall_cell_checked(x, y, direction) {
            Ok(cell) => cell,
            Err(err) => {
                self.metrics.record_rejected_write();
                return Err(err.into());
            }
        };
        self.set_cell(layer, wx, wy, value)
    }

    /// Flip a wall between open and solid, returning the new value.
    pub fn toggle_wall_at(&mut self, x: u32, y: u32, direction: Direction) -> Result<u8> {
        let next = toggled(self.wall_at(x, y, direction)?);
        self.set_wall_at(x, y, direction, next)?;
        Ok(next)
    }

    pub fn type_at(&self, x: u32, y: u32) -> Result<u8> {
        self.cell(LayerKind::Floor, x, y)
    }

    pub fn set_type_at(&mut self, x: u32, y: u32, value: u8) -> Result<()> {
        self.set_cell(LayerKind::Floor, x, y, value)
    }

    /// Empty floor becomes solid; any other kind becomes empty.
    pub fn toggle_type_at(&mut self, x: u32, y: u32) -> Result<u8> {
        let next = toggled(self.type_at(x, y)?);
        self.set_type_at(x, y, next)?;
        Ok(next)
    }

    /// Apply an input-layer edit: edge zones toggle their wall, the interior
    /// toggles the floor. Returns the new cell value.
    pub fn apply_edit(&mut self, position: Position, zone: EditZone) -> Result<u8> {
        match zone {
            EditZone::Edge(direction) => self.toggle_wall_at(position.x, position.y, direction),
            EditZone::Interior => self.toggle_type_at(position.x, position.y),
        }
    }

    pub fn tile(&self, x: u32, y: u32) -> Result<Tile<'_>> {
        self.check_tile(x, y)?;
        Ok(Tile::new(self, Position::new(x, y)))
    }

    pub fn tile_mut(&mut self, x: u32, y: u32) -> Result<TileMut<'_>> {
        self.check_tile(x, y)?;
        Ok(TileMut::new(self, Position::new(x, y)))
    }

    /// Every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile<'_>> + '_ {
        let Size { width, height } = self.size();
        (0..height).flat_map(move |y| (0..width).map(move |x| Tile::new(self, Position::new(x, y))))
    }

    pub fn rotate_cw(&mut self) -> Result<()> {
        self.rotate(Turn::Clockwise)
    }

    pub fn rotate_ccw(&mut self) -> Result<()> {
        self.rotate(Turn::CounterClockwise)
    }

    /// Quarter-turn all three layers, swap the wall roles and advance the
    /// direction indicator. Raises one signal for the whole sequence.
    pub fn rotate(&mut self, turn: Turn) -> Result<()> {
        let layout = RotationEngine::rotate(&mut self.buffer, &self.layout, turn)?;
        let from = self.direction;
        self.layout = layout;
        self.direction = from.turned(turn);
        self.metrics.record_rotation();

        let size = self.size();
        self.log(
            LogLevel::Debug,
            "map_rotated",
            [
                json_kv("turn", format!("{turn:?}")),
                json_kv("from", from.short_name().to_string()),
                json_kv("to", self.direction.short_name().to_string()),
                json_kv("width", size.width),
                json_kv("height", size.height),
            ],
        );
        self.raise_updated();
        Ok(())
    }

    /// Replace the buffer contents byte for byte, as a load does.
    ///
    /// The bytes are interpreted with the current layer roles. A blob of the
    /// wrong length, or one carrying non-binary wall cells, is rejected before
    /// anything is written.
    pub fn restore_bytes(&mut self, bytes: &[u8]) -> std::result::Result<(), PersistenceError> {
        if bytes.len() != self.buffer.len() {
            return Err(PersistenceError::LengthMismatch {
                expected: self.buffer.len(),
                actual: bytes.len(),
            });
        }

        for layer in [LayerKind::WallH, LayerKind::WallV] {
            let view = self.layout.view(layer);
            let range = view.byte_range();
            if let Some(value) = bytes[range].iter().find(|value| !layer.accepts(**value)) {
                return Err(PersistenceError::InvalidContents(format!(
                    "{layer} layer holds value {value}"
                )));
            }
        }

        self.buffer.copy_from_slice(bytes);
        self.metrics.record_load();
        self.raise_updated();
        Ok(())
    }

    fn finish_write(&mut self, outcome: std::result::Result<(), GridError>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.metrics.record_mutation();
                self.raise_updated();
                Ok(())
            }
            Err(err) => {
                self.metrics.record_rejected_write();
                Err(err.into())
            }
        }
    }

    fn check_tile(&self, x: u32, y: u32) -> std::result::Result<(), GridError> {
        self.layout.floor().index(x, y).map(|_| ())
    }

    fn wall_cell_checked(
        &self,
        x: u32,
        y: u32,
        direction: Direction,
    ) -> std::result::Result<(LayerKind, u32, u32), GridError> {
        self.check_tile(x, y)?;
        Ok(wall_cell(Position::new(x, y), direction))
    }

    fn raise_updated(&mut self) {
        self.notifier.mark_changed();
        self.metrics.record_notification();
        let mut subscribers = self.notifier.detach();
        subscribers.deliver(self);
        self.notifier.attach(subscribers);
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(level, LOG_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn toggled(value: u8) -> u8 {
    if value == EMPTY { SOLID } else { EMPTY }
}
