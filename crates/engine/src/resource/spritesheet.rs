use tracing::{error, warn};

/// One named sub-image of a sheet, in sheet pixel coordinates after the
/// multiplier has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetImage {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDescriptor {
    pub sheet_name: String,
    pub images: Vec<SheetImage>,
}

/// Parses the line-oriented sheet descriptor format:
///
/// ```text
/// spritesheet <name>
/// defaultwidth <int>
/// defaultheight <int>
/// multiplyvaluesby <int>
/// image <name> <x> <y> [<w> <h>]
/// ```
///
/// Keywords are case-insensitive; `#` starts a comment line. Coordinates
/// and dimensions (explicit or defaulted) are scaled by the multiplier.
/// A malformed line is logged with its number and skipped; the rest of the
/// sheet still loads. Returns None only when no sheet name was declared.
pub fn parse_sheet_descriptor(source: &str, origin: &str) -> Option<SheetDescriptor> {
    let mut sheet_name: Option<String> = None;
    let mut default_width = 0u32;
    let mut default_height = 0u32;
    let mut multiplier = 1u32;
    let mut images = Vec::new();

    for (line_index, line) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        if keyword.starts_with('#') {
            continue;
        }

        match keyword.to_ascii_lowercase().as_str() {
            "spritesheet" => match tokens.next() {
                Some(name) => sheet_name = Some(name.to_string()),
                None => log_malformed(origin, line_number, "spritesheet keyword without a name"),
            },
            "defaultwidth" => match parse_int(tokens.next()) {
                Some(value) => default_width = value,
                None => log_malformed(origin, line_number, "defaultwidth needs an integer"),
            },
            "defaultheight" => match parse_int(tokens.next()) {
                Some(value) => default_height = value,
                None => log_malformed(origin, line_number, "defaultheight needs an integer"),
            },
            "multiplyvaluesby" => match parse_int(tokens.next()) {
                Some(value) if value > 0 => multiplier = value,
                _ => log_malformed(origin, line_number, "multiplyvaluesby needs a positive integer"),
            },
            "image" => {
                if sheet_name.is_none() {
                    log_malformed(origin, line_number, "image listed before any spritesheet line");
                    continue;
                }
                let name = tokens.next();
                let x = parse_int(tokens.next());
                let y = parse_int(tokens.next());
                let (Some(name), Some(x), Some(y)) = (name, x, y) else {
                    log_malformed(origin, line_number, "image needs a name and x y position");
                    continue;
                };
                let explicit_width = parse_int(tokens.next());
                let explicit_height = parse_int(tokens.next());
                if explicit_width.is_some() != explicit_height.is_some() {
                    log_malformed(origin, line_number, "image size override needs both w and h");
                    continue;
                }
                images.push(SheetImage {
                    name: name.to_string(),
                    x: x.saturating_mul(multiplier),
                    y: y.saturating_mul(multiplier),
                    width: explicit_width.unwrap_or(default_width).saturating_mul(multiplier),
                    height: explicit_height
                        .unwrap_or(default_height)
                        .saturating_mul(multiplier),
                });
            }
            other => log_malformed(origin, line_number, &format!("unknown keyword '{other}'")),
        }
    }

    match sheet_name {
        Some(sheet_name) => Some(SheetDescriptor { sheet_name, images }),
        None => {
            error!(resource = origin, "spritesheet_missing_sheet_declaration");
            None
        }
    }
}

fn parse_int(token: Option<&str>) -> Option<u32> {
    token.and_then(|raw| raw.parse::<u32>().ok())
}

fn log_malformed(origin: &str, line_number: usize, reason: &str) {
    warn!(
        resource = origin,
        line = line_number,
        reason,
        "spritesheet_line_malformed"
    );
}
