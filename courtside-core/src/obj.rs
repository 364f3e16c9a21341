/// Parser for the line-oriented `v`/`vt`/`vn`/`f` geometry format
///
/// Faces are triangles given as three `position/uv/normal` index triplets
/// (1-based). Every face corner is dereferenced into the flat output, so the
/// resulting mesh carries no index buffer. Unknown records are skipped.
use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector2, Vector3};
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, space0, space1, u32 as index},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::geometry::{Mesh, Triangle, Vertex};

/// Indices of one face corner into the position, uv and normal tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    position: usize,
    uv: usize,
    normal: usize,
}

#[derive(Debug)]
struct Face {
    line: usize,
    corners: [Corner; 3],
}

/// Attribute tables and faces gathered before expansion
#[derive(Debug, Default)]
struct Tables {
    positions: Vec<Point3<f32>>,
    uvs: Vec<Vector2<f32>>,
    normals: Vec<Vector3<f32>>,
    faces: Vec<Face>,
}

/// Load and expand a geometry file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading geometry");

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Records are ASCII; stray bytes in comments or unknown records are not errors
    let mesh = parse_obj(&String::from_utf8_lossy(&bytes))?;

    info!(
        path = %path.display(),
        triangles = mesh.triangle_count(),
        "geometry loaded"
    );
    Ok(mesh)
}

/// Parse geometry text into an unindexed mesh.
///
/// Fails on the first malformed record; nothing parsed before it is returned.
pub fn parse_obj(input: &str) -> Result<Mesh, LoadError> {
    let mut tables = Tables::default();

    for (number, line) in input.lines().enumerate() {
        let line_no = number + 1;
        let Ok((rest, tag)) = record_tag(line) else {
            continue; // blank
        };

        match tag {
            "v" => {
                let position = finish(position(rest), line_no, "position")?;
                tables.positions.push(position);
            }
            "vt" => {
                let uv = finish(tex_coord(rest), line_no, "texture coordinate")?;
                tables.uvs.push(uv);
            }
            "vn" => {
                let normal = finish(normal(rest), line_no, "normal")?;
                tables.normals.push(normal);
            }
            "f" => {
                let corners = all_consuming(terminated(face, space0))(rest)
                    .map(|(_, corners)| corners)
                    .map_err(|_| {
                        LoadError::format(
                            line_no,
                            "face must be exactly three position/uv/normal index triplets",
                        )
                    })?;
                tables.faces.push(Face {
                    line: line_no,
                    corners,
                });
            }
            _ => {}
        }
    }

    debug!(
        positions = tables.positions.len(),
        uvs = tables.uvs.len(),
        normals = tables.normals.len(),
        faces = tables.faces.len(),
        "geometry tables read"
    );
    tables.expand()
}

impl Tables {
    fn expand(&self) -> Result<Mesh, LoadError> {
        let mut mesh = Mesh::with_capacity(self.faces.len());

        for face in &self.faces {
            let vertex = |corner: &Corner| -> Result<Vertex, LoadError> {
                Ok(Vertex::new(
                    lookup(&self.positions, corner.position, face.line, "position")?,
                    lookup(&self.uvs, corner.uv, face.line, "texture coordinate")?,
                    lookup(&self.normals, corner.normal, face.line, "normal")?,
                ))
            };
            let [a, b, c] = &face.corners;
            mesh.add_triangle(Triangle::new(vertex(a)?, vertex(b)?, vertex(c)?));
        }

        Ok(mesh)
    }
}

fn lookup<T: Copy>(table: &[T], index: usize, line: usize, kind: &str) -> Result<T, LoadError> {
    index
        .checked_sub(1)
        .and_then(|i| table.get(i))
        .copied()
        .ok_or_else(|| {
            LoadError::format(
                line,
                format!("{kind} index {index} is outside 1..={}", table.len()),
            )
        })
}

fn finish<T>(result: IResult<&str, T>, line: usize, kind: &str) -> Result<T, LoadError> {
    match result {
        Ok((rest, value)) if rest.trim().is_empty() => Ok(value),
        Ok((rest, _)) => Err(LoadError::format(
            line,
            format!("unexpected trailing input after {kind}: {:?}", rest.trim()),
        )),
        Err(_) => Err(LoadError::format(line, format!("malformed {kind} record"))),
    }
}

fn record_tag(input: &str) -> IResult<&str, &str> {
    preceded(space0, take_till1(|c: char| c.is_whitespace()))(input)
}

fn position(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, (x, y, z)) = parse_vector3(input)?;
    // optional homogeneous weight
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn tex_coord(input: &str) -> IResult<&str, Vector2<f32>> {
    let (input, u) = preceded(space1, float)(input)?;
    let (input, v) = preceded(space1, float)(input)?;
    // optional depth component
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, Vector2::new(u, v)))
}

fn normal(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, x) = preceded(space1, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    Ok((input, (x, y, z)))
}

fn face(input: &str) -> IResult<&str, [Corner; 3]> {
    let (input, (a, b, c)) = tuple((
        preceded(space1, corner),
        preceded(space1, corner),
        preceded(space1, corner),
    ))(input)?;
    Ok((input, [a, b, c]))
}

fn corner(input: &str) -> IResult<&str, Corner> {
    let (input, (position, uv, normal)) = tuple((
        index,
        preceded(char('/'), index),
        preceded(char('/'), index),
    ))(input)?;
    Ok((
        input,
        Corner {
            position: position as usize,
            uv: uv as usize,
            normal: normal as usize,
        },
    ))
}
