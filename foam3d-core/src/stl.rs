//! STL reader for binary and ASCII files.
//!
//! Facets become three unshared vertices carrying the facet normal, so the
//! resulting mesh renders flat shaded. Zero normals in the file are rebuilt
//! from the winding.

use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::{all_consuming, cut, opt},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::geometry::{DrawMode, Mesh, Triangle, WHITE};
use crate::math::Vec3;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Facet normal followed by its three corners
type Facet = (Vec3, [Vec3; 3]);

fn build_mesh(facets: Vec<Facet>) -> Mesh {
    let mut mesh = Mesh::with_capacity(DrawMode::Triangles, facets.len() * 3, facets.len() * 3);
    let mut rebuilt = false;
    for (normal, corners) in facets {
        let normal = if normal.is_zero() {
            rebuilt = true;
            Triangle::new(corners[0], corners[1], corners[2]).normal()
        } else {
            normal.normalized()
        };
        for corner in corners {
            mesh.indices.push(mesh.vertices.len() as u32);
            mesh.vertices.push(corner);
            mesh.normals.push(normal);
        }
    }
    mesh.fill_color(WHITE);
    if rebuilt {
        log::debug!("rebuilt missing STL facet normals from winding");
    }
    mesh
}

fn binary_error<'a>(
    context: &'static str,
) -> impl FnOnce(nom::Err<nom::error::Error<&'a [u8]>>) -> Error {
    move |e| {
        Error::Stl(match e {
            nom::Err::Error(err) | nom::Err::Failure(err) => format!(
                "binary {}: {:?} with {} bytes left",
                context,
                err.code,
                err.input.len()
            ),
            nom::Err::Incomplete(_) => format!("binary {}: input ended early", context),
        })
    }
}

fn le_vec3(input: &[u8]) -> IResult<&[u8], Vec3> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Facet> {
    let (input, normal) = le_vec3(input)?;
    let (input, a) = le_vec3(input)?;
    let (input, b) = le_vec3(input)?;
    let (input, c) = le_vec3(input)?;
    // attribute byte count, unused
    let (input, _) = le_u16(input)?;
    Ok((input, (normal, [a, b, c])))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(Error::Stl(format!(
            "binary header needs {} bytes, got {}",
            HEADER_LEN + 4,
            data.len()
        )));
    }
    let (rest, _) = take(HEADER_LEN)(data).map_err(binary_error("header"))?;
    let (rest, triangle_count) = le_u32(rest).map_err(binary_error("triangle count"))?;
    let triangle_count = triangle_count as usize;
    let needed = triangle_count.saturating_mul(FACET_LEN);
    if rest.len() < needed {
        return Err(Error::Stl(format!(
            "header declares {} triangles ({} bytes) but only {} bytes follow",
            triangle_count,
            needed,
            rest.len()
        )));
    }

    let (_, facets) = count(binary_facet, triangle_count)(rest).map_err(binary_error("facets"))?;
    log::debug!("parsed binary STL with {} triangles", facets.len());
    Ok(build_mesh(facets))
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(word))
}

fn ascii_vec3(input: &str) -> IResult<&str, Vec3> {
    let (input, (x, y, z)) = tuple((
        preceded(multispace1, float),
        preceded(multispace1, float),
        preceded(multispace1, float),
    ))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vec3> {
    preceded(keyword("vertex"), ascii_vec3)(input)
}

/// Everything after `facet`; errors here are fatal so they keep their position
fn ascii_facet_body(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = ascii_vec3(input)?;
    let (input, _) = keyword("outer")(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (a, b, c)) = tuple((ascii_vertex, ascii_vertex, ascii_vertex))(input)?;
    let (input, _) = keyword("endloop")(input)?;
    let (input, _) = keyword("endfacet")(input)?;
    Ok((input, (normal, [a, b, c])))
}

fn ascii_facet(input: &str) -> IResult<&str, Facet> {
    preceded(keyword("facet"), cut(ascii_facet_body))(input)
}

fn ascii_solid(input: &str) -> IResult<&str, (&str, Vec<Facet>)> {
    let (input, _) = keyword("solid")(input)?;
    let (input, name) = not_line_ending(input)?;
    let (input, facets) = many0(ascii_facet)(input)?;
    let (input, _) = keyword("endsolid")(input)?;
    let (input, _) = terminated(opt(not_line_ending), multispace0)(input)?;
    Ok((input, (name.trim(), facets)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh> {
    let (_, (name, facets)) = all_consuming(ascii_solid)(input).map_err(|e| {
        let detail = match e {
            nom::Err::Error(err) | nom::Err::Failure(err) => {
                let line = input.len() - err.input.len();
                let line = input[..line].lines().count().max(1);
                format!("ASCII parse failed near line {} ({:?})", line, err.code)
            }
            nom::Err::Incomplete(_) => "ASCII input ended early".to_string(),
        };
        Error::Stl(detail)
    })?;
    log::debug!("parsed ASCII STL '{}' with {} triangles", name, facets.len());
    Ok(build_mesh(facets))
}

/// Detect the format and parse. Files that start with `solid` but fail the
/// ASCII grammar are retried as binary, since some exporters write that
/// word into the binary header.
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => return Ok(mesh),
                Err(e) => log::debug!("not ASCII STL, trying binary: {}", e),
            }
        }
    }
    parse_binary_stl(data)
}
