//! STL reading and writing.
//!
//! Both encodings are read; the binary layout is recognized by its exact
//! size (`84 + 50 * count`), anything else starting with `solid` is parsed
//! as ASCII. STL stores three corners per facet, so corners are welded by
//! exact position to recover shared edges.
//!
//! ```text
//! UINT8[80]    header
//! UINT32       triangle count
//! per triangle REAL32[3] normal, REAL32[3] x 3 corners, UINT16 attribute
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use forgemesh::Mesh;
use glam::DVec3;
use hashbrown::HashMap;

use crate::error::{IoError, IoResult};

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// Loads an STL file of either encoding.
pub fn load_stl(path: impl AsRef<Path>) -> IoResult<Mesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IoError::opening(path, e))?;
    let mesh = parse_stl(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "loaded STL"
    );
    Ok(mesh)
}

/// Parses STL bytes of either encoding.
pub fn parse_stl(bytes: &[u8]) -> IoResult<Mesh> {
    if is_binary(bytes) {
        parse_binary(bytes)
    } else if starts_with_solid(bytes) {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| IoError::invalid_content(format!("ASCII STL is not UTF-8: {e}")))?;
        parse_ascii(text)
    } else {
        Err(IoError::invalid_content("neither binary nor ASCII STL"))
    }
}

fn starts_with_solid(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"solid")
}

fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_SIZE + 4 {
        return false;
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    bytes.len() == HEADER_SIZE + 4 + count * TRIANGLE_SIZE
}

fn parse_binary(bytes: &[u8]) -> IoResult<Mesh> {
    let mut welder = Welder::default();
    for facet in bytes[HEADER_SIZE + 4..].chunks_exact(TRIANGLE_SIZE) {
        // Skip the stored normal
        let corners = [
            read_point(&facet[12..24]),
            read_point(&facet[24..36]),
            read_point(&facet[36..48]),
        ];
        welder.add_facet(corners);
    }
    Ok(welder.finish())
}

fn read_point(buf: &[u8]) -> DVec3 {
    let f = |i: usize| f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
    DVec3::new(f64::from(f(0)), f64::from(f(4)), f64::from(f(8)))
}

fn parse_ascii(text: &str) -> IoResult<Mesh> {
    let mut welder = Welder::default();
    let mut corners: Vec<DVec3> = Vec::with_capacity(3);

    for (number, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("outer") => corners.clear(),
            Some("vertex") => {
                let mut coord = || -> IoResult<f64> {
                    parts
                        .next()
                        .and_then(|p| p.parse().ok())
                        .ok_or_else(|| {
                            IoError::invalid_content(format!("bad vertex on line {}", number + 1))
                        })
                };
                corners.push(DVec3::new(coord()?, coord()?, coord()?));
            }
            Some("endloop") => {
                if corners.len() != 3 {
                    return Err(IoError::invalid_content(format!(
                        "facet ending on line {} has {} vertices",
                        number + 1,
                        corners.len()
                    )));
                }
                welder.add_facet([corners[0], corners[1], corners[2]]);
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    Ok(welder.finish())
}

/// Deduplicates corners by exact position.
#[derive(Default)]
struct Welder {
    mesh: Mesh,
    index: HashMap<[u64; 3], u32>,
}

impl Welder {
    fn add_facet(&mut self, corners: [DVec3; 3]) {
        let [a, b, c] = corners.map(|p| self.vertex(p));
        // Facets collapsed by welding carry no surface
        if a != b && b != c && a != c {
            self.mesh.add_triangle(a, b, c);
        }
    }

    fn vertex(&mut self, p: DVec3) -> u32 {
        // +0.0 folds negative zero onto positive zero
        let key = [p.x + 0.0, p.y + 0.0, p.z + 0.0].map(f64::to_bits);
        let mesh = &mut self.mesh;
        *self.index.entry(key).or_insert_with(|| mesh.add_vertex(p))
    }

    fn finish(self) -> Mesh {
        self.mesh
    }
}

/// Writes `mesh` as binary STL and returns the number of bytes written.
pub fn write_stl_binary<W: Write>(mesh: &Mesh, mut writer: W) -> IoResult<u64> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by forgemesh";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| IoError::invalid_content("too many triangles for STL"))?;
    writer.write_all(&count.to_le_bytes())?;

    for i in 0..mesh.triangle_count() {
        let normal = mesh.face_normal(i).normalize_or_zero();
        write_point(&mut writer, normal)?;
        for p in mesh.triangle_positions(mesh.triangle(i)) {
            write_point(&mut writer, p)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    writer.flush()?;

    Ok((HEADER_SIZE + 4 + mesh.triangle_count() * TRIANGLE_SIZE) as u64)
}

fn write_point<W: Write>(writer: &mut W, p: DVec3) -> IoResult<()> {
    for v in p.to_array() {
        writer.write_all(&(v as f32).to_le_bytes())?;
    }
    Ok(())
}

/// Writes `mesh` as ASCII STL and returns the number of bytes written.
pub fn write_stl_ascii<W: Write>(mesh: &Mesh, writer: W) -> IoResult<u64> {
    let mut writer = CountingWriter::new(writer);
    writeln!(writer, "solid forgemesh")?;
    for i in 0..mesh.triangle_count() {
        let n = mesh.face_normal(i).normalize_or_zero();
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in mesh.triangle_positions(mesh.triangle(i)) {
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid forgemesh")?;
    writer.flush()?;
    Ok(writer.written)
}

/// Saves `mesh` to `path`, binary unless `ascii` is set.
pub fn save_stl(mesh: &Mesh, path: impl AsRef<Path>, ascii: bool) -> IoResult<u64> {
    let writer = BufWriter::new(File::create(path)?);
    if ascii {
        write_stl_ascii(mesh, writer)
    } else {
        write_stl_binary(mesh, writer)
    }
}

/// Counts bytes passing through to the inner writer.
pub(crate) struct CountingWriter<W> {
    inner: W,
    pub(crate) written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use forgemesh::is_watertight;
    use forgemesh::primitives::create_box;

    fn cube() -> Mesh {
        create_box(DVec3::new(2.0, 3.0, 4.0), false).unwrap()
    }

    #[test]
    fn test_binary_round_trip_welds_corners() {
        let mut bytes = Vec::new();
        let written = write_stl_binary(&cube(), &mut bytes).unwrap();
        assert_eq!(written as usize, bytes.len());
        assert_eq!(bytes.len(), 84 + 12 * 50);

        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(is_watertight(&mesh));
        assert_relative_eq!(mesh.signed_volume(), 24.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ascii_round_trip() {
        let mut bytes = Vec::new();
        let written = write_stl_ascii(&cube(), &mut bytes).unwrap();
        assert_eq!(written as usize, bytes.len());
        assert!(bytes.starts_with(b"solid"));

        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert!(is_watertight(&mesh));
    }

    #[test]
    fn test_hand_written_ascii() {
        let text = "solid tri\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 100 0 0\n   vertex 0 100 0\n  endloop\n endfacet\nendsolid tri\n";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_relative_eq!(mesh.dimensions().x, 100.0);
    }

    #[test]
    fn test_negative_zero_welds_with_zero() {
        let text = "solid z\n\
            outer loop\n vertex 0 0 0\n vertex 1 0 0\n vertex 0 1 0\n endloop\n\
            outer loop\n vertex -0 0 0\n vertex 0 -1 0\n vertex 1 0 0\n endloop\n\
            endsolid z\n";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_binary_header_starting_with_solid() {
        let mut bytes = Vec::new();
        write_stl_binary(&cube(), &mut bytes).unwrap();
        bytes[..5].copy_from_slice(b"solid");
        assert_eq!(parse_stl(&bytes).unwrap().triangle_count(), 12);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            parse_stl(b"hello"),
            Err(IoError::InvalidContent { .. })
        ));
        let broken = "solid x\nouter loop\nvertex 0 0\nendloop\n";
        assert!(parse_stl(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        let written = save_stl(&cube(), &path, false).unwrap();
        assert_eq!(written, std::fs::metadata(&path).unwrap().len());
        assert_eq!(load_stl(&path).unwrap().triangle_count(), 12);
    }
}
