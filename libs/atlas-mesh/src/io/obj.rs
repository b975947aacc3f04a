//! # Wavefront OBJ
//!
//! Minimal OBJ subset: `v x y z` vertex lines, optional `vn` normals and
//! 1-based triangular faces.
//! The reader also accepts `a/b/c` face tokens and ignores every other
//! statement (normals, texture coordinates, groups, comments).

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use glam::DVec3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes a mesh as OBJ text.
///
/// Computed vertex normals are written as `vn` lines and referenced from
/// the faces as `f a//a b//b c//c`.
pub fn write_obj<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    match mesh.normals() {
        Some(normals) => {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
            for tri in mesh.triangles() {
                let [a, b, c] = tri.map(|i| i + 1);
                writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
            }
        }
        None => {
            for tri in mesh.triangles() {
                writeln!(writer, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1)?;
            }
        }
    }
    Ok(())
}

/// Writes a mesh to an OBJ file, replacing any existing file.
///
/// The file only appears at `path` once it is complete, so an interrupted
/// run never leaves a truncated mesh behind.
///
/// # Errors
///
/// Returns [`MeshError::OutputPath`] if the parent directory is missing and
/// [`MeshError::Io`] if the write fails.
pub fn write_obj_file(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    write_replacing(path, |writer| write_obj(mesh, writer))
}

/// Writes through a sibling temp file and renames it onto `path`.
fn write_replacing<F>(path: &Path, write: F) -> MeshResult<()>
where
    F: FnOnce(&mut BufWriter<NamedTempFile>) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(MeshError::OutputPath {
            path: dir.to_path_buf(),
        });
    }

    let temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".obj.partial")
        .tempfile_in(dir)
        .map_err(|e| MeshError::io(path, e))?;
    let mut writer = BufWriter::new(temp);
    write(&mut writer).map_err(|e| MeshError::io(path, e))?;
    let temp = writer
        .into_inner()
        .map_err(|e| MeshError::io(path, e.into_error()))?;
    temp.as_file().sync_all().map_err(|e| MeshError::io(path, e))?;
    temp.persist(path).map_err(|e| MeshError::io(path, e.error))?;
    Ok(())
}

/// Parses OBJ text into a mesh.
///
/// Polygonal faces are fan-triangulated.
///
/// # Errors
///
/// Returns [`MeshError::Parse`] on malformed numbers or out-of-range indices.
pub fn read_obj<R: BufRead>(reader: R) -> MeshResult<Mesh> {
    let mut mesh = Mesh::new();
    let mut faces: Vec<(usize, Vec<u32>)> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| MeshError::parse(line_no, e.to_string()))?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords = tokens
                    .take(3)
                    .map(|t| t.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| MeshError::parse(line_no, e.to_string()))?;
                let &[x, y, z] = coords.as_slice() else {
                    return Err(MeshError::parse(line_no, "vertex needs 3 coordinates"));
                };
                mesh.add_vertex(DVec3::new(x, y, z));
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| parse_face_index(t, line_no))
                    .collect::<MeshResult<Vec<_>>>()?;
                if corners.len() < 3 {
                    return Err(MeshError::parse(line_no, "face needs at least 3 vertices"));
                }
                faces.push((line_no, corners));
            }
            _ => {}
        }
    }

    let count = mesh.vertex_count() as u32;
    for (line_no, corners) in faces {
        if let Some(&bad) = corners.iter().find(|&&c| c >= count) {
            return Err(MeshError::parse(
                line_no,
                format!("vertex index {} out of range", bad + 1),
            ));
        }
        for k in 1..corners.len() - 1 {
            mesh.add_triangle(corners[0], corners[k], corners[k + 1]);
        }
    }
    Ok(mesh)
}

/// Reads an OBJ file.
pub fn read_obj_file(path: &Path) -> MeshResult<Mesh> {
    let file = File::open(path).map_err(|e| MeshError::io(path, e))?;
    read_obj(BufReader::new(file))
}

fn parse_face_index(token: &str, line_no: usize) -> MeshResult<u32> {
    let head = token.split('/').next().unwrap_or(token);
    let one_based: u32 = head
        .parse()
        .map_err(|_| MeshError::parse(line_no, format!("bad face index '{token}'")))?;
    one_based
        .checked_sub(1)
        .ok_or_else(|| MeshError::parse(line_no, "face indices are 1-based"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn triangle() -> Mesh {
        Mesh::from_parts(
            vec![DVec3::ZERO, DVec3::new(1.5, 0.0, 0.0), DVec3::new(0.0, 2.25, -1.0)],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_write_format() {
        let mut out = Vec::new();
        write_obj(&triangle(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "v 0 0 0\nv 1.5 0 0\nv 0 2.25 -1\nf 1 2 3\n");
    }

    #[test]
    fn test_write_with_normals() {
        let mut mesh = triangle();
        mesh.compute_normals();
        let mut out = Vec::new();
        write_obj(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 3);
        assert!(text.ends_with("f 1//1 2//2 3//3\n"));
        assert_eq!(read_obj(Cursor::new(text)).unwrap(), triangle());
    }

    #[test]
    fn test_read_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.obj");
        write_obj_file(&triangle(), &path).unwrap();
        assert_eq!(read_obj_file(&path).unwrap(), triangle());
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("7.obj");
        assert!(matches!(
            write_obj_file(&triangle(), &path),
            Err(MeshError::OutputPath { .. })
        ));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.obj");
        let result = write_replacing(&path, |writer| {
            writeln!(writer, "v 0 0 0")?;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "interrupted"))
        });
        assert!(matches!(result, Err(MeshError::Io { .. })));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.obj");
        write_obj_file(&triangle(), &path).unwrap();
        let result = write_replacing(&path, |writer| {
            writeln!(writer, "v 9 9 9")?;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "interrupted"))
        });
        assert!(result.is_err());
        assert_eq!(read_obj_file(&path).unwrap(), triangle());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_ignores_other_statements_and_fans_polygons() {
        let text = "# comment\no region\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1\n";
        let mesh = read_obj(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_read_rejects_bad_index() {
        let err = read_obj(Cursor::new("v 0 0 0\nf 1 2 3\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
        let err = read_obj(Cursor::new("f 0 1 2\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_read_rejects_short_vertex() {
        let err = read_obj(Cursor::new("v 1 2\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));
    }
}
