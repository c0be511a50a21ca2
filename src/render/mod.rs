use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    chem::{Atom, ELEMENT_COUNT, Formula, element_name, element_symbol},
    ecs::{Outcome, PuzzleWorld},
    harvest::{Field, Progress, ResourceType, Stockpile, Vec2, Viewport},
    map::Thing,
    rules::Rule,
    words::{Noun, Property, Word},
};

/// Terminal columns per board cell.
pub const CELL_WIDTH: i32 = 6;

/// World units covered by one terminal cell on the harvest screen.
pub const WORLD_UNITS_PER_CELL: f32 = 2.0;

fn noun_color(noun: Noun) -> RGB {
    match noun {
        Noun::Baba => RGB::named(MAGENTA),
        Noun::Key => RGB::named(GOLD),
        Noun::Wall => RGB::named(GRAY),
        Noun::Rock => RGB::from_u8(222, 184, 135),
        Noun::Text => RGB::from_u8(147, 112, 219),
        Noun::Love => RGB::from_u8(255, 105, 180),
        Noun::Flag => RGB::named(YELLOW),
        Noun::Water => RGB::from_u8(30, 144, 255),
        Noun::Lava => RGB::from_u8(255, 69, 0),
    }
}

fn property_color(property: Property) -> RGB {
    match property {
        Property::You => RGB::named(PINK),
        Property::Win => RGB::named(YELLOW),
        Property::Stop => RGB::from_u8(0, 100, 0),
        Property::Push => RGB::from_u8(222, 184, 135),
        Property::Defeat | Property::Hot => RGB::from_u8(255, 69, 0),
        Property::Sink | Property::Tele => RGB::named(LIGHT_BLUE),
        _ => RGB::named(ORANGE),
    }
}

pub fn word_color(word: Word) -> RGB {
    match word {
        Word::Noun(noun) => noun_color(noun),
        Word::Property(property) => property_color(property),
        Word::Verb(_) | Word::And => RGB::named(WHITE),
    }
}

pub fn object_glyph(noun: Noun) -> char {
    match noun {
        Noun::Baba => '@',
        Noun::Key => 'k',
        Noun::Wall => '#',
        Noun::Rock => 'o',
        Noun::Text => 't',
        Noun::Love => 'v',
        Noun::Flag => 'F',
        Noun::Water => '~',
        Noun::Lava => '&',
    }
}

/// What a cell shows: text wins over objects, the last object over earlier ones.
fn cell_face(things: &[Thing]) -> Option<Thing> {
    things
        .iter()
        .rev()
        .find(|thing| thing.is_text())
        .or_else(|| things.last())
        .copied()
}

fn cell_label(thing: Thing) -> String {
    match thing {
        Thing::Text(word) => word.as_str().chars().take(CELL_WIDTH as usize - 1).collect(),
        Thing::Object(noun) => format!("  {}", object_glyph(noun)),
    }
}

fn faces(world: &PuzzleWorld) -> Vec<(Point, Thing)> {
    let bounds = world.bounds();
    let things = world.things();
    let mut faces = Vec::new();
    for y in 0..bounds.height {
        for x in 0..bounds.width {
            let point = Point::new(x, y);
            let here: Vec<Thing> = things
                .iter()
                .filter(|(at, _, _)| *at == point)
                .map(|(_, thing, _)| *thing)
                .collect();
            if let Some(face) = cell_face(&here) {
                faces.push((point, face));
            }
        }
    }
    faces
}

pub fn draw_board(ctx: &mut BTerm, world: &PuzzleWorld, origin: Point) {
    let bounds = world.bounds();
    for y in 0..bounds.height {
        for x in 0..bounds.width {
            let screen_x = origin.x + x * CELL_WIDTH + CELL_WIDTH / 2 - 1;
            ctx.set(
                screen_x,
                origin.y + y,
                RGB::from_u8(105, 105, 105),
                RGB::named(BLACK),
                to_cp437('.'),
            );
        }
    }
    for (point, face) in faces(world) {
        let screen_x = origin.x + point.x * CELL_WIDTH;
        let screen_y = origin.y + point.y;
        let blank = " ".repeat(CELL_WIDTH as usize);
        ctx.print_color(screen_x, screen_y, RGB::named(BLACK), RGB::named(BLACK), &blank);
        let color = match face {
            Thing::Text(word) => word_color(word),
            Thing::Object(noun) => noun_color(noun),
        };
        ctx.print_color(screen_x, screen_y, color, RGB::named(BLACK), cell_label(face));
    }
}

pub fn draw_rules(ctx: &mut BTerm, rules: &[Rule], x: i32, y: i32, max_rows: i32) {
    ctx.print_color(x, y, RGB::named(WHITE), RGB::named(BLACK), "Rules");
    if rules.is_empty() {
        ctx.print_color(x, y + 1, RGB::named(DARK_GRAY), RGB::named(BLACK), "(none)");
        return;
    }
    let columns = 3;
    let column_width = 26;
    for (idx, rule) in rules.iter().enumerate() {
        let row = idx as i32 / columns;
        if row >= max_rows {
            break;
        }
        let col = idx as i32 % columns;
        ctx.print_color(
            x + col * column_width,
            y + 1 + row,
            word_color(Word::Noun(rule.subject)),
            RGB::named(BLACK),
            rule.to_string(),
        );
    }
}

pub fn draw_banner(ctx: &mut BTerm, outcome: Outcome, y: i32) {
    let (text, color) = match outcome {
        Outcome::Playing => return,
        Outcome::Won => ("Congratulations! Press r to play again.", RGB::named(YELLOW)),
        Outcome::Lost => ("Nothing is YOU. Press z to undo or r to restart.", RGB::named(ORANGE)),
    };
    ctx.print_color_centered(y, color, RGB::named(BLACK), text);
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let (width, _) = ctx.get_char_size();
    let height = (log.len() as i32).min(5) + 2;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(2, top + 1, RGB::named(WHITE), RGB::named(BLACK), "Event Log");
    for (row, entry) in log.iter().take(5).enumerate() {
        ctx.print(2, top + 2 + row as i32, entry);
    }
}

/// The board as plain text, one row per line, `CELL_WIDTH` columns per cell.
pub fn ascii_board(world: &PuzzleWorld) -> String {
    let bounds = world.bounds();
    let faces = faces(world);
    let mut out = String::new();
    for y in 0..bounds.height {
        let mut line = String::new();
        for x in 0..bounds.width {
            let face = faces
                .iter()
                .find(|(point, _)| *point == Point::new(x, y))
                .map(|(_, face)| *face);
            let label = match face {
                Some(face) => cell_label(face),
                None => "  .".to_string(),
            };
            line.push_str(&format!("{label:<width$}", width = CELL_WIDTH as usize));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn resource_color(kind: ResourceType) -> RGB {
    match kind {
        ResourceType::Metal => RGB::from_u8(211, 211, 211),
        ResourceType::Wood => RGB::from_u8(139, 69, 19),
        ResourceType::Water => RGB::named(BLUE),
        ResourceType::Energy => RGB::named(YELLOW),
    }
}

pub fn draw_loading(ctx: &mut BTerm, progress: &Progress) {
    let fraction = progress.fraction().clamp(0.0, 1.0);
    ctx.print_color(2, 2, RGB::named(WHITE), RGB::named(BLACK), "Generating world");
    ctx.print_color(
        2,
        4,
        RGB::from_u8(211, 211, 211),
        RGB::named(BLACK),
        progress.stage().label(),
    );
    ctx.draw_bar_horizontal(
        2,
        6,
        40,
        (fraction * 100.0) as i32,
        100,
        RGB::named(BLUE),
        RGB::named(DARK_GRAY),
    );
    ctx.print_color(
        44,
        6,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!("{}%", (fraction * 100.0) as i32),
    );
    ctx.print_color(
        2,
        8,
        RGB::from_u8(211, 211, 211),
        RGB::named(BLACK),
        format!("Total patches: {:>8}", progress.patches_placed()),
    );
    ctx.print_color(
        2,
        9,
        RGB::from_u8(211, 211, 211),
        RGB::named(BLACK),
        format!("Total nodes:   {:>8}", progress.nodes_grown()),
    );
    ctx.print_color(2, 11, RGB::named(DARK_GRAY), RGB::named(BLACK), "Esc to cancel");
}

/// The viewport that fills a `columns` x `rows` area around `center`.
pub fn field_viewport(center: Vec2, columns: i32, rows: i32) -> Viewport {
    Viewport::centered_on(
        center,
        columns as f32 * WORLD_UNITS_PER_CELL,
        rows as f32 * WORLD_UNITS_PER_CELL,
    )
}

pub fn world_to_screen(view: &Viewport, pos: Vec2, top: i32) -> Point {
    Point::new(
        ((pos.x - view.origin.x) / WORLD_UNITS_PER_CELL) as i32,
        top + ((pos.y - view.origin.y) / WORLD_UNITS_PER_CELL) as i32,
    )
}

pub fn draw_field(
    ctx: &mut BTerm,
    field: &Field,
    view: &Viewport,
    top: i32,
    collection_range: f32,
) {
    for node in field.visible_nodes(view) {
        let point = world_to_screen(view, node.pos, top);
        ctx.set(
            point.x,
            point.y,
            resource_color(node.kind),
            RGB::named(BLACK),
            to_cp437('*'),
        );
    }

    let cursor = world_to_screen(view, view.center(), top);
    let reach = (collection_range / WORLD_UNITS_PER_CELL).round().max(1.0) as i32;
    for (dx, dy) in [(-reach, 0), (reach, 0), (0, -reach), (0, reach)] {
        ctx.set(
            cursor.x + dx,
            cursor.y + dy,
            RGB::named(GRAY),
            RGB::named(BLACK),
            to_cp437('+'),
        );
    }
    ctx.set(cursor.x, cursor.y, RGB::named(WHITE), RGB::named(BLACK), to_cp437('X'));
}

pub fn draw_stockpile(ctx: &mut BTerm, stockpile: &Stockpile, field: &Field, view: &Viewport) {
    let mut x = 1;
    for kind in ResourceType::ALL {
        let label = format!("{}: {}", kind.as_str(), stockpile.get(kind));
        ctx.print_color(x, 0, resource_color(kind), RGB::named(BLACK), &label);
        x += label.len() as i32 + 3;
    }
    ctx.print_color(
        1,
        1,
        RGB::named(MAGENTA),
        RGB::named(BLACK),
        format!(
            "Visible patches: {}  Visible nodes: {}",
            field.visible_patches(view).count(),
            field.visible_nodes(view).count()
        ),
    );
}

pub fn element_table() -> String {
    let mut out = String::new();
    for z in 1..=ELEMENT_COUNT {
        let atom = Atom::neutral(z);
        out.push_str(&format!(
            "{z:>3}  {:<3} {:<14} {}\n",
            element_symbol(z).unwrap_or("?"),
            element_name(z).unwrap_or("?"),
            atom.group()
        ));
    }
    out
}

pub fn element_details(z: u8) -> String {
    let atom = Atom::neutral(z);
    let mut out = format!(
        "{} ({}), atomic number {z}\n",
        element_name(z).unwrap_or("?"),
        element_symbol(z).unwrap_or("?")
    );
    out.push_str(&format!("  group:             {}\n", atom.group()));
    out.push_str(&format!(
        "  neutral atom:      {}p {}n {}e\n",
        atom.protons, atom.neutrons, atom.electrons
    ));
    out.push_str(&format!("  mass:              {:.6} amu\n", atom.mass()));
    out.push_str(&format!("  valence shell:     {}\n", atom.valence_shell()));
    out.push_str(&format!("  valence electrons: {}\n", atom.valence_electrons()));
    out
}

pub fn formula_details(formula: &Formula) -> String {
    format!(
        "{formula}: {} atoms, {:.4} amu ({:.4e} kg)\n",
        formula.atoms(),
        formula.mass(),
        crate::chem::amu_to_kg(formula.mass())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Level;

    #[test]
    fn text_beats_objects_in_a_cell() {
        let things = [
            Thing::Object(Noun::Rock),
            Thing::Text(Word::Noun(Noun::Baba)),
            Thing::Object(Noun::Wall),
        ];
        assert_eq!(cell_face(&things), Some(Thing::Text(Word::Noun(Noun::Baba))));
        assert_eq!(cell_face(&[]), None);
    }

    #[test]
    fn long_words_fit_in_a_cell() {
        assert_eq!(cell_label(Thing::Text(Word::Property(Property::Defeat))), "DEFEA");
        assert_eq!(cell_label(Thing::Object(Noun::Baba)), "  @");
    }

    #[test]
    fn ascii_board_draws_the_demo() {
        let world = PuzzleWorld::from_level(&Level::demo()).unwrap();
        let board = ascii_board(&world);
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].contains("BABA  IS    YOU"));
        assert!(lines[5].contains('@'));
        assert!(lines[5].contains('#'));
        assert!(lines[5].contains('F'));
    }

    #[test]
    fn table_lists_every_element() {
        let table = element_table();
        assert_eq!(table.lines().count(), ELEMENT_COUNT as usize);
        assert!(table.lines().next().is_some_and(|line| line.contains("Hydrogen")));
    }

    #[test]
    fn screen_mapping_puts_the_center_mid_screen() {
        let view = field_viewport(Vec2::ZERO, 80, 40);
        assert_eq!(world_to_screen(&view, Vec2::ZERO, 2), Point::new(40, 22));
    }
}
