//! Floor plan generation and initial agent population.
//!
//! The layout is deterministic for given bounds except for the garden
//! court, whose cells are randomly tagged path/plant/water. The rng is
//! injected so tests can seed it.
//!
//! Frame, in grid coordinates (y grows downward):
//!
//! ```text
//! +--------------------------------------------------+
//! |  suite row (doors opening south)                 |
//! |--------------- top corridor ---------------------|
//! | wing |cor|                              |cor| wing|
//! | suite|rid|      atrium                  |rid|suite|
//! | pairs|or |   [reception]                |or |pairs|
//! |      |   |      [garden court]          |   |     |
//! |      |   |                  [service hub]   |     |
//! +--------------------------------------------------+
//! ```

use hecs::World;
use rand::Rng;

use veranda_logic::grid::{Cell, CellPos, Grid, Room, RoomKind};

use crate::components::{AgentId, Behavior, Dialogue, Mood, Position, PrevPosition, Role};

/// Smallest bounds the fixed layout constants fit into.
pub const MIN_WIDTH: i32 = 48;
pub const MIN_HEIGHT: i32 = 36;

/// Default floor dimensions.
pub const DEFAULT_WIDTH: i32 = 64;
pub const DEFAULT_HEIGHT: i32 = 44;

/// Suite footprint including its walls.
const SUITE_SIZE: i32 = 6;
/// Width of the wing corridors and the top corridor.
const CORRIDOR_W: i32 = 3;

/// Mood labels assigned at spawn.
const MOODS: [&str; 8] = [
    "content",
    "curious",
    "restless",
    "cheerful",
    "weary",
    "daydreaming",
    "serene",
    "talkative",
];

/// Floor generation failures. Generation always succeeds for bounds that
/// satisfy the minimums; anything smaller is rejected at startup.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("floor bounds {width}x{height} below minimum {MIN_WIDTH}x{MIN_HEIGHT}")]
    BoundsTooSmall { width: i32, height: i32 },
}

/// Result of floor generation: the terrain grid, the ordered room list,
/// and the two anchor points the behavior sampler biases toward.
#[derive(Debug, Clone)]
pub struct FloorPlan {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub atrium_center: CellPos,
    pub reception_center: CellPos,
}

/// Generate the hotel floor.
pub fn generate_floor(
    width: i32,
    height: i32,
    rng: &mut impl Rng,
) -> Result<FloorPlan, GenerationError> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(GenerationError::BoundsTooSmall { width, height });
    }

    let mut grid = Grid::new(width, height);
    let mut rooms = Vec::new();
    let mut next_room_id = 0u32;
    let mut add_room = |rooms: &mut Vec<Room>, name: String, kind: RoomKind, min: CellPos, max: CellPos| {
        let id = next_room_id;
        next_room_id += 1;
        rooms.push(Room::new(id, name, kind, min, max));
    };

    // Atrium spans the space between the wing corridors.
    let atrium_x0 = 1 + SUITE_SIZE + CORRIDOR_W; // 10
    let atrium_x1 = width - 2 - SUITE_SIZE - CORRIDOR_W; // width - 11
    let top_corridor_y0 = 1 + SUITE_SIZE; // 7
    let top_corridor_y1 = top_corridor_y0 + CORRIDOR_W - 1; // 9
    let atrium_y0 = top_corridor_y1 + 1; // 10
    let atrium_y1 = height - 2;

    grid.fill_rect(atrium_x0, atrium_y0, atrium_x1, atrium_y1, Cell::LobbyFloor);
    add_room(
        &mut rooms,
        "Atrium".to_string(),
        RoomKind::Lobby,
        CellPos::new(atrium_x0, atrium_y0),
        CellPos::new(atrium_x1, atrium_y1),
    );

    // Top corridor links both wings across the atrium's north edge.
    grid.fill_rect(
        atrium_x0 - CORRIDOR_W,
        top_corridor_y0,
        atrium_x1 + CORRIDOR_W,
        top_corridor_y1,
        Cell::LobbyFloor,
    );

    // Wing corridors run the full height of the wings.
    grid.fill_rect(
        atrium_x0 - CORRIDOR_W,
        top_corridor_y0,
        atrium_x0 - 1,
        atrium_y1,
        Cell::LobbyFloor,
    );
    grid.fill_rect(
        atrium_x1 + 1,
        top_corridor_y0,
        atrium_x1 + CORRIDOR_W,
        atrium_y1,
        Cell::LobbyFloor,
    );

    // Reception desk sub-area just inside the atrium's north edge.
    let cx = width / 2;
    let reception_min = CellPos::new(cx - 2, atrium_y0 + 1);
    let reception_max = CellPos::new(cx + 1, atrium_y0 + 2);
    grid.fill_rect(
        reception_min.x,
        reception_min.y,
        reception_max.x,
        reception_max.y,
        Cell::ReceptionDesk,
    );
    add_room(
        &mut rooms,
        "Reception".to_string(),
        RoomKind::Lobby,
        reception_min,
        reception_max,
    );

    // Garden court in the middle of the atrium. The only nondeterministic
    // part of generation: each cell rolls path, plant or water.
    let garden_w = ((atrium_x1 - atrium_x0 + 1) / 3).max(6);
    let garden_h = ((atrium_y1 - atrium_y0 + 1) / 3).max(5);
    let gcx = (atrium_x0 + atrium_x1) / 2;
    let gcy = (atrium_y0 + atrium_y1) / 2;
    let garden_min = CellPos::new(gcx - garden_w / 2, gcy - garden_h / 2);
    let garden_max = CellPos::new(garden_min.x + garden_w - 1, garden_min.y + garden_h - 1);
    for y in garden_min.y..=garden_max.y {
        for x in garden_min.x..=garden_max.x {
            let roll: f32 = rng.gen();
            let cell = if roll > 0.8 {
                Cell::GardenPlant
            } else if roll > 0.6 {
                Cell::GardenWater
            } else {
                Cell::GardenPath
            };
            grid.set(x, y, cell);
        }
    }
    add_room(
        &mut rooms,
        "Garden Court".to_string(),
        RoomKind::Garden,
        garden_min,
        garden_max,
    );

    // Service hub alcove in the atrium's south-east corner; robots charge here.
    let hub_min = CellPos::new(atrium_x1 - 3, atrium_y1 - 2);
    let hub_max = CellPos::new(atrium_x1 - 1, atrium_y1);
    grid.fill_rect(hub_min.x, hub_min.y, hub_max.x, hub_max.y, Cell::ServiceHub);
    add_room(
        &mut rooms,
        "Service Hub".to_string(),
        RoomKind::Service,
        hub_min,
        hub_max,
    );

    // Corridors are rooms too, so every walkable cell resolves to a
    // location for prompts and occupancy queries.
    add_room(
        &mut rooms,
        "North Corridor".to_string(),
        RoomKind::Lobby,
        CellPos::new(atrium_x0 - CORRIDOR_W, top_corridor_y0),
        CellPos::new(atrium_x1 + CORRIDOR_W, top_corridor_y1),
    );
    add_room(
        &mut rooms,
        "West Corridor".to_string(),
        RoomKind::Lobby,
        CellPos::new(atrium_x0 - CORRIDOR_W, top_corridor_y0),
        CellPos::new(atrium_x0 - 1, atrium_y1),
    );
    add_room(
        &mut rooms,
        "East Corridor".to_string(),
        RoomKind::Lobby,
        CellPos::new(atrium_x1 + 1, top_corridor_y0),
        CellPos::new(atrium_x1 + CORRIDOR_W, atrium_y1),
    );

    // West wing: paired suites stacked along the corridor, doors east.
    let mut suite_no = 101;
    let mut y0 = atrium_y0;
    while y0 + 2 * (SUITE_SIZE - 1) <= atrium_y1 {
        for room_y in [y0, y0 + SUITE_SIZE - 1] {
            let min = CellPos::new(1, room_y);
            let max = CellPos::new(SUITE_SIZE, room_y + SUITE_SIZE - 1);
            carve_suite(&mut grid, min, max, DoorSide::East);
            add_room(&mut rooms, format!("Suite {suite_no}"), RoomKind::Suite, min, max);
            suite_no += 1;
        }
        y0 += 2 * (SUITE_SIZE - 1) + 2;
    }

    // East wing: mirrored, doors west.
    suite_no = 201;
    y0 = atrium_y0;
    while y0 + 2 * (SUITE_SIZE - 1) <= atrium_y1 {
        for room_y in [y0, y0 + SUITE_SIZE - 1] {
            let min = CellPos::new(width - 1 - SUITE_SIZE, room_y);
            let max = CellPos::new(width - 2, room_y + SUITE_SIZE - 1);
            carve_suite(&mut grid, min, max, DoorSide::West);
            add_room(&mut rooms, format!("Suite {suite_no}"), RoomKind::Suite, min, max);
            suite_no += 1;
        }
        y0 += 2 * (SUITE_SIZE - 1) + 2;
    }

    // Suite row above the top corridor, doors south.
    suite_no = 301;
    let mut x0 = atrium_x0;
    while x0 + SUITE_SIZE - 1 <= atrium_x1 {
        let min = CellPos::new(x0, 1);
        let max = CellPos::new(x0 + SUITE_SIZE - 1, SUITE_SIZE);
        carve_suite(&mut grid, min, max, DoorSide::South);
        add_room(&mut rooms, format!("Suite {suite_no}"), RoomKind::Suite, min, max);
        suite_no += 1;
        x0 += SUITE_SIZE - 1;
    }

    outline_walls(&mut grid);

    Ok(FloorPlan {
        atrium_center: CellPos::new(gcx, gcy),
        reception_center: CellPos::new(cx, atrium_y0 + 1),
        grid,
        rooms,
    })
}

/// Which wall of a suite carries its door.
#[derive(Clone, Copy)]
enum DoorSide {
    East,
    West,
    South,
}

/// Carve a suite: wall border, floor interior, one door onto the corridor,
/// and a couple of furniture cells in opposite interior corners.
fn carve_suite(grid: &mut Grid, min: CellPos, max: CellPos, door: DoorSide) {
    grid.fill_rect(min.x, min.y, max.x, max.y, Cell::RoomWall);
    grid.fill_rect(min.x + 1, min.y + 1, max.x - 1, max.y - 1, Cell::RoomFloor);

    let mid_x = (min.x + max.x) / 2;
    let mid_y = (min.y + max.y) / 2;
    let door_pos = match door {
        DoorSide::East => CellPos::new(max.x, mid_y),
        DoorSide::West => CellPos::new(min.x, mid_y),
        DoorSide::South => CellPos::new(mid_x, max.y),
    };
    grid.set(door_pos.x, door_pos.y, Cell::RoomDoor);

    grid.set(min.x + 1, min.y + 1, Cell::RoomFurniture);
    grid.set(max.x - 1, max.y - 1, Cell::RoomFurniture);
}

/// Outline every carved region: empty cells touching anything non-empty
/// become walls, giving the lobby and corridors their enclosure.
fn outline_walls(grid: &mut Grid) {
    let mut walls = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.get(x, y) != Some(Cell::Empty) {
                continue;
            }
            let touches_interior = (-1..=1).any(|dy| {
                (-1..=1).any(|dx| {
                    !(dx == 0 && dy == 0)
                        && !matches!(grid.get(x + dx, y + dy), None | Some(Cell::Empty) | Some(Cell::Wall))
                })
            });
            if touches_interior {
                walls.push((x, y));
            }
        }
    }
    for (x, y) in walls {
        grid.set(x, y, Cell::Wall);
    }
}

/// Spawn the fixed population: `guests` guests plus `robots` robots, robot
/// roles alternating waiter/concierge by index (R-1 is a waiter). Returns
/// ids in creation order paired with their entities.
pub fn spawn_agents(
    world: &mut World,
    plan: &FloorPlan,
    guests: u32,
    robots: u32,
    rng: &mut impl Rng,
) -> Vec<(AgentId, hecs::Entity)> {
    let mut roster = Vec::with_capacity((guests + robots) as usize);

    for i in 1..=guests {
        let pos = random_walkable_near(&plan.grid, plan.atrium_center, 12, rng)
            .unwrap_or(plan.reception_center);
        roster.push(spawn_agent(world, AgentId::new(format!("G-{i}")), Role::Guest, pos, rng));
    }

    let hub_center = plan
        .rooms
        .iter()
        .find(|r| r.kind == RoomKind::Service)
        .map_or(plan.atrium_center, Room::center);

    for i in 1..=robots {
        let (role, anchor) = if i % 2 == 1 {
            (Role::RobotWaiter, hub_center)
        } else {
            (Role::RobotConcierge, plan.reception_center)
        };
        let pos = random_walkable_near(&plan.grid, anchor, 4, rng).unwrap_or(anchor);
        roster.push(spawn_agent(world, AgentId::new(format!("R-{i}")), role, pos, rng));
    }

    roster
}

fn spawn_agent(
    world: &mut World,
    id: AgentId,
    role: Role,
    pos: CellPos,
    rng: &mut impl Rng,
) -> (AgentId, hecs::Entity) {
    let mood = MOODS[rng.gen_range(0..MOODS.len())];
    let entity = world.spawn((
        id.clone(),
        role,
        Position(pos),
        PrevPosition(pos),
        Behavior::idle(),
        Mood(mood.to_string()),
        Dialogue::default(),
    ));
    (id, entity)
}

/// A random walkable cell within `radius` of `anchor`, or `None` after a
/// bounded number of attempts.
fn random_walkable_near(
    grid: &Grid,
    anchor: CellPos,
    radius: i32,
    rng: &mut impl Rng,
) -> Option<CellPos> {
    for _ in 0..64 {
        let x = anchor.x + rng.gen_range(-radius..=radius);
        let y = anchor.y + rng.gen_range(-radius..=radius);
        if grid.is_walkable(x, y) {
            return Some(CellPos::new(x, y));
        }
    }
    None
}
