/// Module specifier importing `target` from `from`, both given as
/// `/`-separated paths from the same root. The extension is dropped and the
/// result always starts with `./` or `../`.
pub fn relative_import(from: &str, target: &str) -> String {
    let from_dir: Vec<&str> = split(from).collect::<Vec<_>>();
    let from_dir = &from_dir[..from_dir.len().saturating_sub(1)];
    let target: Vec<&str> = split(target).collect();

    let common = from_dir
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
    parts.extend(&target[common..]);

    let joined = strip_extension(&parts.join("/"));
    if joined.starts_with("../") {
        joined
    } else {
        format!("./{joined}")
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

fn strip_extension(path: &str) -> String {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => path[..file_start + dot].to_string(),
        _ => path.to_string(),
    }
}
