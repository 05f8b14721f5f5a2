// Configuration file, all measurements in world units (1 unit = 1 meter)
// This controls the default street growth and block filling settings

// Demo host defaults
pub const INITIAL_WORLD_SEED: u64 = 1512086461918454205;
pub const DEMO_SETTLEMENT_RADIUS: f32 = 90.0;
pub const DEMO_BOUNDARY_VERTICES: usize = 9;
pub const DEMO_TILE_SIZE: f32 = 30.0;     // world tile pitch the fake roads cross
pub const DEMO_MAX_ROADS: usize = 4;

// Street growth (meters)
pub const GRID_SPACING: f32 = 25.0;      // candidate grid pitch
pub const GRID_JITTER: f32 = 8.0;        // +/- offset applied to each grid point
pub const MIN_NODE_SPACING: f32 = 15.0;  // no two intersections closer than this
pub const MAX_NODE_DEGREE: usize = 4;
pub const MIN_STREET_ANGLE_DEG: f32 = 55.0;

// Gate to center threading
pub const GATE_SEARCH_FACTOR: f32 = 2.5;   // * GRID_SPACING, neighbour radius per hop
pub const GATE_ARRIVAL_FACTOR: f32 = 2.0;  // * GRID_SPACING, connect straight to target inside this
pub const GATE_STEP_WEIGHT: f32 = 0.3;     // weight of hop length in the hop score
pub const MAX_GATE_HOPS: usize = 20;
pub const GATE_DEDUP_FACTOR: f32 = 2.0;    // * MIN_NODE_SPACING

// District infill
pub const INFILL_RADIUS_FACTOR: f32 = 2.0;  // * GRID_SPACING
pub const CENTER_PAIR_BIAS: f32 = 0.5;
pub const GATE_PAIR_BIAS: f32 = 0.7;
pub const BUSY_NODE_PENALTY: f32 = 1.2;     // per endpoint already at degree >= 3
pub const SHORT_EDGE_PENALTY: f32 = 1.3;
pub const SHORT_EDGE_FACTOR: f32 = 1.2;     // * MIN_NODE_SPACING, below this a street is an alley

// Street widths
pub const MAIN_STREET_WIDTH: f32 = 8.0;
pub const DISTRICT_STREET_WIDTH: f32 = 5.0;
pub const ALLEY_WIDTH: f32 = 2.0;

// Face finding
pub const MAX_FACE_AREA: f32 = 4000.0;  // larger closed faces are treated as boundary artifacts

// Block filling
pub const BLOCK_AREA_MIN: f32 = 100.0;
pub const BLOCK_AREA_MAX: f32 = 3000.0;
pub const BLOCK_INSET: f32 = 3.0;         // street margin pulled in from every block corner
pub const INSET_AREA_MIN: f32 = 40.0;
pub const AREA_PER_BUILDING: f32 = 120.0; // m2 of inset block per building at density 1.0
pub const BUILDING_SPACING: f32 = 2.0;    // padding around each footprint's bounding box
pub const PLACEMENT_ATTEMPT_FACTOR: usize = 10;
pub const AXIS_ALIGNED_CHANCE: f32 = 0.8;
pub const BUILDING_SIZE_CHAOS: f32 = 0.2; // +/- fraction applied to default width and depth

// Per-block building limits assume a settlement splits into this many blocks
pub const ASSUMED_BLOCKS_MIN: usize = 5;
pub const ASSUMED_BLOCKS_MAX: usize = 10;
