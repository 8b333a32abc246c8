//! Snake simulation on a walled grid

use crate::error::{GameError, Result};
use nibbler_plugin_api::{colors, Argb, Frame};
use rand::Rng;
use std::collections::VecDeque;

/// Smallest playable board width, walls included
pub const MIN_WIDTH: usize = 10;
/// Smallest playable board height, walls included
pub const MIN_HEIGHT: usize = 10;
/// Player length at spawn, head included
pub const INITIAL_LENGTH: usize = 4;

/// Heading of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    North,
    #[default]
    South,
    East,
    West,
}

impl Orientation {
    /// The reverse heading
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    fn offset(self) -> (isize, isize) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }
}

/// Content of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Background,
    Wall,
    Head,
    Body,
    Food,
}

impl Entity {
    /// Display color
    pub fn color(self) -> Argb {
        match self {
            Self::Background => colors::BLACK,
            Self::Wall => colors::WHITE,
            Self::Head => colors::RED,
            Self::Body => colors::YELLOW,
            Self::Food => colors::GREEN,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Background => "nothing",
            Self::Wall => "a wall",
            Self::Head | Self::Body => "itself",
            Self::Food => "food",
        }
    }
}

/// Cell position, `(x, y)` from the top-left corner
pub type Cell = (usize, usize);

/// Row-major matrix of entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Entity>,
}

impl Grid {
    /// Create a grid whose border cells are walls
    pub fn walled(width: usize, height: usize) -> Self {
        let mut grid = Self {
            width,
            height,
            cells: vec![Entity::Background; width * height],
        };
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    grid.set((x, y), Entity::Wall);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Entity at `cell`, `None` when out of bounds
    pub fn get(&self, (x, y): Cell) -> Option<Entity> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[x + y * self.width])
    }

    /// Overwrite the entity at `cell`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, (x, y): Cell, entity: Entity) {
        if x < self.width && y < self.height {
            self.cells[x + y * self.width] = entity;
        }
    }

    /// Number of cells holding `entity`
    pub fn count(&self, entity: Entity) -> usize {
        self.cells.iter().filter(|&&e| e == entity).count()
    }

    fn neighbor(&self, (x, y): Cell, orientation: Orientation) -> Option<Cell> {
        let (dx, dy) = orientation.offset();
        let x = x.checked_add_signed(dx)?;
        let y = y.checked_add_signed(dy)?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    fn empty_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &e)| e == Entity::Background)
            .map(|(i, _)| (i % self.width, i / self.width))
            .collect()
    }
}

/// Result of a successful tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Player advanced one cell
    Moved,
    /// Player ate food and grew
    Ate,
}

/// Board plus player
#[derive(Debug)]
pub struct Snake {
    grid: Grid,
    /// Head first
    body: VecDeque<Cell>,
    heading: Orientation,
}

impl Snake {
    /// Create a board with the player centred, body above the head, facing south.
    ///
    /// Fails with [`GameError::SimulationBoundary`] below the minimum size.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(GameError::SimulationBoundary {
                width,
                height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }

        let mut grid = Grid::walled(width, height);
        let (x, y) = (width / 2, height / 2);
        let body: VecDeque<Cell> = (0..INITIAL_LENGTH).map(|i| (x, y - i)).collect();

        grid.set((x, y), Entity::Head);
        for &cell in body.iter().skip(1) {
            grid.set(cell, Entity::Body);
        }

        let mut snake = Self {
            grid,
            body,
            heading: Orientation::South,
        };
        snake.spawn_food()?;

        log::debug!("Snake board {}x{} ready", width, height);
        Ok(snake)
    }

    /// Advance one cell towards `requested`.
    ///
    /// Reversing onto the body is ignored and the current heading kept.
    /// Hitting a wall or the body fails with
    /// [`GameError::SimulationCollision`] and leaves the board untouched.
    pub fn step(&mut self, requested: Orientation) -> Result<StepOutcome> {
        if requested != self.heading.opposite() {
            self.heading = requested;
        }

        let head = self.head();
        let next = self
            .grid
            .neighbor(head, self.heading)
            .ok_or(GameError::SimulationCollision("the edge", head.0, head.1))?;

        match self.grid.get(next) {
            Some(Entity::Background) => {
                if let Some(tail) = self.body.pop_back() {
                    self.grid.set(tail, Entity::Background);
                }
                self.advance(head, next);
                Ok(StepOutcome::Moved)
            }
            Some(Entity::Food) => {
                self.advance(head, next);
                self.spawn_food()?;
                Ok(StepOutcome::Ate)
            }
            Some(other) => Err(GameError::SimulationCollision(other.name(), next.0, next.1)),
            None => Err(GameError::SimulationCollision("the edge", next.0, next.1)),
        }
    }

    fn advance(&mut self, head: Cell, next: Cell) {
        self.grid.set(head, Entity::Body);
        self.grid.set(next, Entity::Head);
        self.body.push_front(next);
    }

    fn spawn_food(&mut self) -> Result<()> {
        let empty = self.grid.empty_cells();
        if empty.is_empty() {
            return Err(GameError::NoEmptySpace);
        }
        let cell = empty[rand::thread_rng().gen_range(0..empty.len())];
        self.grid.set(cell, Entity::Food);
        Ok(())
    }

    /// Head position
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Player length, head included
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn heading(&self) -> Orientation {
        self.heading
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current board as pixels
    pub fn frame(&self) -> Frame {
        Frame {
            width: self.grid.width,
            height: self.grid.height,
            pixels: self.grid.cells.iter().map(|e| e.color()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food_cell(snake: &Snake) -> Cell {
        let grid = snake.grid();
        (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .find(|&cell| grid.get(cell) == Some(Entity::Food))
            .unwrap()
    }

    #[test]
    fn test_spawn_layout() {
        let snake = Snake::new(20, 20).unwrap();
        assert_eq!(snake.head(), (10, 10));
        assert_eq!(snake.len(), INITIAL_LENGTH);
        assert_eq!(snake.heading(), Orientation::South);

        let grid = snake.grid();
        assert_eq!(grid.get((10, 10)), Some(Entity::Head));
        assert_eq!(grid.get((10, 9)), Some(Entity::Body));
        assert_eq!(grid.get((10, 7)), Some(Entity::Body));
        assert_eq!(grid.get((0, 5)), Some(Entity::Wall));
        assert_eq!(grid.get((19, 19)), Some(Entity::Wall));
        assert_eq!(grid.count(Entity::Food), 1);
    }

    #[test]
    fn test_too_small() {
        let result = Snake::new(9, 20);
        assert!(matches!(result, Err(GameError::SimulationBoundary { width: 9, .. })));
        assert!(Snake::new(20, 3).is_err());
        assert!(Snake::new(MIN_WIDTH, MIN_HEIGHT).is_ok());
    }

    #[test]
    fn test_move_keeps_length() {
        let mut snake = Snake::new(20, 20).unwrap();
        let food = food_cell(&snake);
        snake.grid.set(food, Entity::Background);

        assert_eq!(snake.step(Orientation::East).unwrap(), StepOutcome::Moved);
        assert_eq!(snake.head(), (11, 10));
        assert_eq!(snake.len(), INITIAL_LENGTH);
        assert_eq!(snake.grid().count(Entity::Body), INITIAL_LENGTH - 1);
        assert_eq!(snake.grid().get((10, 7)), Some(Entity::Background));
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut snake = Snake::new(20, 20).unwrap();
        let food = food_cell(&snake);
        snake.grid.set(food, Entity::Background);

        snake.step(Orientation::North).unwrap();
        assert_eq!(snake.head(), (10, 11));
        assert_eq!(snake.heading(), Orientation::South);
    }

    #[test]
    fn test_eat_grows_and_respawns_food() {
        let mut snake = Snake::new(20, 20).unwrap();
        let food = food_cell(&snake);
        snake.grid.set(food, Entity::Background);
        snake.grid.set((10, 11), Entity::Food);

        assert_eq!(snake.step(Orientation::South).unwrap(), StepOutcome::Ate);
        assert_eq!(snake.len(), INITIAL_LENGTH + 1);
        assert_eq!(snake.grid().count(Entity::Food), 1);
    }

    #[test]
    fn test_wall_collision() {
        let mut snake = Snake::new(10, 10).unwrap();
        let food = food_cell(&snake);
        snake.grid.set(food, Entity::Background);

        let mut result = Ok(StepOutcome::Moved);
        for _ in 0..10 {
            result = snake.step(Orientation::South);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(GameError::SimulationCollision("a wall", 5, 9))));
        assert_eq!(snake.grid().get((5, 9)), Some(Entity::Wall));
    }

    #[test]
    fn test_no_empty_space() {
        let mut snake = Snake::new(10, 10).unwrap();
        for y in 1..9 {
            for x in 1..9 {
                if snake.grid().get((x, y)) == Some(Entity::Background) {
                    snake.grid.set((x, y), Entity::Body);
                }
            }
        }
        let food = food_cell(&snake);
        snake.grid.set(food, Entity::Body);
        snake.grid.set((5, 6), Entity::Food);

        assert!(matches!(snake.step(Orientation::South), Err(GameError::NoEmptySpace)));
    }

    #[test]
    fn test_frame_colors() {
        let snake = Snake::new(12, 10).unwrap();
        let frame = snake.frame();
        assert_eq!((frame.width, frame.height), (12, 10));
        assert_eq!(frame.at(0, 0), Some(colors::WHITE));
        assert_eq!(frame.at(6, 5), Some(colors::RED));
        assert_eq!(frame.at(6, 4), Some(colors::YELLOW));
    }
}
