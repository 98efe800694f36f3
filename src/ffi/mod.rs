// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code for allowing other languages to talk to this Rust library.
//!
//! Every function returns an exit code; 0 means success. If the code is
//! non-zero, the error message can be obtained by (1) getting the length of
//! the error string by calling `ab_last_error_length` and (2) calling
//! `ab_last_error_message` with a string buffer with a length at least equal
//! to the error length.
//!
//! Generators follow a count-then-fill convention: call the `_count` function
//! to find out how many values will be produced, allocate that many, then
//! call the `_generate` function.

#![allow(clippy::too_many_arguments)]


use std::{cell::RefCell, os::raw::c_char, slice};

use crate::{
    array_factor::{calc_array_factor_inner, wavenumber},
    sky::{MirrorAxis, Projection, SectorOptions},
    BeamError, BeamFloat, CircularLayout, Position2D, PositionGenerator, RegularGrid,
    SkyDirection, SkyPositions,
};

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Set the most recent error, clearing whatever may have been there before.
pub(crate) fn update_last_error(err: String) {
    LAST_ERROR.with(|prev| {
        *prev.borrow_mut() = Some(err);
    });
}

/// Unpack a result, or store the error message and return 1.
macro_rules! ffi_try {
    ($result:expr) => {
        match $result {
            Ok(v) => v,
            Err(e) => {
                update_last_error(e.to_string());
                return 1;
            }
        }
    };
}

/// Get the number of bytes needed to hold the most recent error message
/// (including the trailing null byte). If there is no error, 0 is returned.
#[no_mangle]
pub extern "C" fn ab_last_error_length() -> i32 {
    LAST_ERROR.with(|prev| match prev.borrow().as_ref() {
        Some(err) => i32::try_from(err.len() + 1).unwrap_or(i32::MAX),
        None => 0,
    })
}

/// Write the most recent error message into `buffer` as a null-terminated
/// string. `length` is the number of bytes available in `buffer`.
///
/// # Returns
///
/// * The number of bytes written (excluding the null byte), 0 if there is no
///   error, or -1 if `buffer` is null or too small.
///
#[no_mangle]
pub unsafe extern "C" fn ab_last_error_message(buffer: *mut c_char, length: i32) -> i32 {
    if buffer.is_null() || length < 0 {
        return -1;
    }
    LAST_ERROR.with(|prev| {
        let prev = prev.borrow();
        let err = match prev.as_ref() {
            Some(err) => err.as_bytes(),
            None => return 0,
        };
        if err.len() >= length as usize {
            return -1;
        }
        let buffer = slice::from_raw_parts_mut(buffer.cast::<u8>(), length as usize);
        buffer[..err.len()].copy_from_slice(err);
        buffer[err.len()] = 0;
        err.len() as i32
    })
}

/// A slice from a C pointer. A null pointer is only acceptable if `len` is 0.
unsafe fn input_slice<'a, T>(
    ptr: *const T,
    len: usize,
    name: &'static str,
) -> Result<&'a [T], BeamError> {
    if len == 0 {
        Ok(Default::default())
    } else if ptr.is_null() {
        Err(BeamError::invalid(name, "the pointer is null"))
    } else {
        Ok(slice::from_raw_parts(ptr, len))
    }
}

unsafe fn output_slice<'a, T>(
    ptr: *mut T,
    len: usize,
    name: &'static str,
) -> Result<&'a mut [T], BeamError> {
    if len == 0 {
        Ok(Default::default())
    } else if ptr.is_null() {
        Err(BeamError::invalid(name, "the pointer is null"))
    } else {
        Ok(slice::from_raw_parts_mut(ptr, len))
    }
}

unsafe fn write_out<T>(ptr: *mut T, value: T, name: &'static str) -> Result<(), BeamError> {
    match ptr.as_mut() {
        Some(out) => {
            *out = value;
            Ok(())
        }
        None => Err(BeamError::invalid(name, "the pointer is null")),
    }
}

fn to_u32(n: usize) -> Result<u32, BeamError> {
    u32::try_from(n)
        .map_err(|_| BeamError::invalid("count", format!("{n} doesn't fit in 32 bits")))
}

/// Count a generator's positions and write the count into `count`.
unsafe fn count_into<G: PositionGenerator>(
    generator: &G,
    count: *mut u32,
) -> Result<(), BeamError> {
    let n = to_u32(generator.count()?)?;
    write_out(count, n, "count")
}

/// Run a generator and unpack its positions into the `x` and `y` buffers,
/// each of which has `length` elements.
unsafe fn generate_into<G, P>(
    generator: &G,
    length: u32,
    x: *mut f64,
    y: *mut f64,
    num_written: *mut u32,
    unpack: P,
) -> Result<(), BeamError>
where
    G: PositionGenerator,
    P: Fn(G::Item) -> (f64, f64),
{
    let length = length as usize;
    let x = output_slice(x, length, "x")?;
    let y = output_slice(y, length, "y")?;
    let mut items = vec![G::Item::default(); length];
    let n = generator.generate(&mut items)?;
    for ((item, x), y) in items[..n].iter().zip(x.iter_mut()).zip(y.iter_mut()) {
        (*x, *y) = unpack(*item);
    }
    write_out(num_written, to_u32(n)?, "num_written")
}

fn unpack_position(p: Position2D<f64>) -> (f64, f64) {
    (p.x, p.y)
}

fn unpack_direction(d: SkyDirection<f64>) -> (f64, f64) {
    (d.az, d.el)
}

/// Get the number of antennas in a square grid.
///
/// # Arguments
///
/// * `per_side` - The number of antennas along each side of the grid.
/// * `separation_m` - The distance between neighbouring antennas \[metres\].
/// * `count` - The number of antennas is written here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_regular_grid_count(
    per_side: u32,
    separation_m: f64,
    count: *mut u32,
) -> i32 {
    ffi_try!(count_into(&RegularGrid::new(per_side as usize, separation_m), count));
    0
}

/// Generate the antenna positions of a square grid centred on the origin.
///
/// # Arguments
///
/// * `per_side` - The number of antennas along each side of the grid.
/// * `separation_m` - The distance between neighbouring antennas \[metres\].
/// * `length` - The number of elements available in each of `x` and `y`.
///   This must be at least the count given by `ab_regular_grid_count`.
/// * `x` - The east coordinates \[metres\] are written here.
/// * `y` - The north coordinates \[metres\] are written here.
/// * `num_written` - The number of antennas written is put here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_regular_grid_generate(
    per_side: u32,
    separation_m: f64,
    length: u32,
    x: *mut f64,
    y: *mut f64,
    num_written: *mut u32,
) -> i32 {
    let grid = RegularGrid::new(per_side as usize, separation_m);
    ffi_try!(generate_into(&grid, length, x, y, num_written, unpack_position));
    0
}

unsafe fn circular_layout(
    seed: u64,
    radius_m: f64,
    x_sep_m: f64,
    y_sep_m: f64,
    x_err_m: f64,
    y_err_m: f64,
    min_separation_m: *const f64,
) -> CircularLayout {
    let layout = CircularLayout::new(seed, radius_m, x_sep_m, y_sep_m, x_err_m, y_err_m);
    match min_separation_m.as_ref() {
        Some(&min) => layout.with_min_separation(min),
        None => layout,
    }
}

/// Get the number of antennas in a perturbed circular layout.
///
/// # Arguments
///
/// * `seed` - The random-number seed. Must be non-zero.
/// * `radius_m` - The aperture radius \[metres\].
/// * `x_sep_m` - The nominal east-west antenna separation \[metres\].
/// * `y_sep_m` - The nominal north-south antenna separation \[metres\].
/// * `x_err_m` - The largest east-west placement error \[metres\].
/// * `y_err_m` - The largest north-south placement error \[metres\].
/// * `min_separation_m` - An optional pointer to the smallest allowed
///   distance between antennas \[metres\]. If this is null, half of the
///   smaller nominal separation is used.
/// * `count` - The number of antennas is written here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_circular_layout_count(
    seed: u64,
    radius_m: f64,
    x_sep_m: f64,
    y_sep_m: f64,
    x_err_m: f64,
    y_err_m: f64,
    min_separation_m: *const f64,
    count: *mut u32,
) -> i32 {
    let layout = circular_layout(
        seed,
        radius_m,
        x_sep_m,
        y_sep_m,
        x_err_m,
        y_err_m,
        min_separation_m,
    );
    ffi_try!(count_into(&layout, count));
    0
}

/// Generate the antenna positions of a perturbed circular layout. The
/// arguments are the same as for `ab_circular_layout_count`, except:
///
/// * `length` - The number of elements available in each of `x` and `y`.
/// * `x` - The east coordinates \[metres\] are written here.
/// * `y` - The north coordinates \[metres\] are written here.
/// * `num_written` - The number of antennas written is put here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_circular_layout_generate(
    seed: u64,
    radius_m: f64,
    x_sep_m: f64,
    y_sep_m: f64,
    x_err_m: f64,
    y_err_m: f64,
    min_separation_m: *const f64,
    length: u32,
    x: *mut f64,
    y: *mut f64,
    num_written: *mut u32,
) -> i32 {
    let layout = circular_layout(
        seed,
        radius_m,
        x_sep_m,
        y_sep_m,
        x_err_m,
        y_err_m,
        min_separation_m,
    );
    ffi_try!(generate_into(&layout, length, x, y, num_written, unpack_position));
    0
}

fn sky_positions(
    centre_lon_rad: f64,
    centre_lat_rad: f64,
    half_width_lon_rad: f64,
    half_width_lat_rad: f64,
    spacing_lon_rad: f64,
    spacing_lat_rad: f64,
    above_horizon: u8,
    mirror: i32,
    projection: i32,
) -> Result<SkyPositions, BeamError> {
    let above_horizon = match above_horizon {
        0 => false,
        1 => true,
        _ => {
            return Err(BeamError::invalid(
                "above_horizon",
                "a value other than 0 or 1 was used",
            ))
        }
    };
    let mirror = match mirror {
        0 => None,
        1 => Some(MirrorAxis::Longitude),
        2 => Some(MirrorAxis::Latitude),
        _ => {
            return Err(BeamError::invalid(
                "mirror",
                "a value other than 0, 1 or 2 was used",
            ))
        }
    };
    let projection = Projection::try_from(projection)?;
    Ok(SkyPositions::new(
        SkyDirection::new(centre_lon_rad, centre_lat_rad),
        (half_width_lon_rad, half_width_lat_rad),
        (spacing_lon_rad, spacing_lat_rad),
    )
    .with_options(SectorOptions {
        above_horizon,
        mirror,
        projection,
    }))
}

/// Get the number of sky directions in a sector.
///
/// # Arguments
///
/// * `centre_lon_rad`, `centre_lat_rad` - The centre of the sector
///   \[radians\].
/// * `half_width_lon_rad`, `half_width_lat_rad` - The half-widths of the
///   sector \[radians\].
/// * `spacing_lon_rad`, `spacing_lat_rad` - The spacing between directions
///   \[radians\].
/// * `above_horizon` - A boolean; if 1, only directions between the horizon
///   and the zenith are kept.
/// * `mirror` - 0 for no mirroring, 1 to negate longitude offsets, 2 to
///   negate latitude offsets.
/// * `projection` - 0 for none, 1 for orthographic (SIN), 2 for gnomonic
///   (TAN), 3 for sinusoidal (SFL).
/// * `count` - The number of directions is written here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_sky_positions_count(
    centre_lon_rad: f64,
    centre_lat_rad: f64,
    half_width_lon_rad: f64,
    half_width_lat_rad: f64,
    spacing_lon_rad: f64,
    spacing_lat_rad: f64,
    above_horizon: u8,
    mirror: i32,
    projection: i32,
    count: *mut u32,
) -> i32 {
    let sky = ffi_try!(sky_positions(
        centre_lon_rad,
        centre_lat_rad,
        half_width_lon_rad,
        half_width_lat_rad,
        spacing_lon_rad,
        spacing_lat_rad,
        above_horizon,
        mirror,
        projection,
    ));
    ffi_try!(count_into(&sky, count));
    0
}

/// Generate the sky directions in a sector. The arguments are the same as
/// for `ab_sky_positions_count`, except:
///
/// * `length` - The number of elements available in each of `lon_rad` and
///   `lat_rad`.
/// * `lon_rad` - The longitudes \[radians\] are written here.
/// * `lat_rad` - The latitudes \[radians\] are written here.
/// * `num_written` - The number of directions written is put here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_sky_positions_generate(
    centre_lon_rad: f64,
    centre_lat_rad: f64,
    half_width_lon_rad: f64,
    half_width_lat_rad: f64,
    spacing_lon_rad: f64,
    spacing_lat_rad: f64,
    above_horizon: u8,
    mirror: i32,
    projection: i32,
    length: u32,
    lon_rad: *mut f64,
    lat_rad: *mut f64,
    num_written: *mut u32,
) -> i32 {
    let sky = ffi_try!(sky_positions(
        centre_lon_rad,
        centre_lat_rad,
        half_width_lon_rad,
        half_width_lat_rad,
        spacing_lon_rad,
        spacing_lat_rad,
        above_horizon,
        mirror,
        projection,
    ));
    ffi_try!(generate_into(
        &sky,
        length,
        lon_rad,
        lat_rad,
        num_written,
        unpack_direction
    ));
    0
}

/// Shared by the single- and double-precision array-factor functions.
unsafe fn calc_array_factor_ffi<F: BeamFloat>(
    num_antennas: u32,
    x: *const F,
    y: *const F,
    num_directions: u32,
    az_rad: *const F,
    el_rad: *const F,
    boresight_az_rad: F,
    boresight_el_rad: F,
    freq_hz: f64,
    image: *mut F,
) -> Result<(), BeamError> {
    let num_antennas = num_antennas as usize;
    let num_directions = num_directions as usize;
    let x = input_slice(x, num_antennas, "x")?;
    let y = input_slice(y, num_antennas, "y")?;
    let az = input_slice(az_rad, num_directions, "az_rad")?;
    let el = input_slice(el_rad, num_directions, "el_rad")?;
    let image = output_slice(image, 2 * num_directions, "image")?;

    let antennas: Vec<Position2D<F>> = x
        .iter()
        .zip(y)
        .map(|(&x, &y)| Position2D::new(x, y))
        .collect();
    let directions: Vec<SkyDirection<F>> = az
        .iter()
        .zip(el)
        .map(|(&az, &el)| SkyDirection::new(az, el))
        .collect();
    calc_array_factor_inner(
        &antennas,
        &directions,
        SkyDirection::new(boresight_az_rad, boresight_el_rad),
        F::from_f64(wavenumber(freq_hz)),
        image,
    )
}

/// Get the array factor of a set of antennas for many sky directions, in
/// double precision. The directions are handled in parallel.
///
/// Complex numbers can't be passed across the FFI boundary, so the real and
/// imaginary components are unpacked into doubles; `image` must have at least
/// `2 * num_directions` elements allocated.
///
/// # Arguments
///
/// * `num_antennas` - The number of elements in `x` and `y`.
/// * `x`, `y` - The east and north antenna coordinates \[metres\].
/// * `num_directions` - The number of elements in `az_rad` and `el_rad`.
/// * `az_rad`, `el_rad` - The sky directions \[radians\].
/// * `boresight_az_rad`, `boresight_el_rad` - The direction the array is
///   pointed at \[radians\].
/// * `freq_hz` - The frequency \[Hz\].
/// * `image` - The interleaved real and imaginary array-factor values are
///   written here.
///
/// # Returns
///
/// * An exit code integer. If this is non-zero then an error occurred; the
///   details can be obtained with `ab_last_error_length` and
///   `ab_last_error_message`.
///
#[no_mangle]
pub unsafe extern "C" fn ab_calc_array_factor(
    num_antennas: u32,
    x: *const f64,
    y: *const f64,
    num_directions: u32,
    az_rad: *const f64,
    el_rad: *const f64,
    boresight_az_rad: f64,
    boresight_el_rad: f64,
    freq_hz: f64,
    image: *mut f64,
) -> i32 {
    ffi_try!(calc_array_factor_ffi(
        num_antennas,
        x,
        y,
        num_directions,
        az_rad,
        el_rad,
        boresight_az_rad,
        boresight_el_rad,
        freq_hz,
        image,
    ));
    0
}

/// The same as `ab_calc_array_factor`, but the inputs, outputs and all
/// arithmetic are single precision. Only `freq_hz` is a double.
#[no_mangle]
pub unsafe extern "C" fn ab_calc_array_factor_float(
    num_antennas: u32,
    x: *const f32,
    y: *const f32,
    num_directions: u32,
    az_rad: *const f32,
    el_rad: *const f32,
    boresight_az_rad: f32,
    boresight_el_rad: f32,
    freq_hz: f64,
    image: *mut f32,
) -> i32 {
    ffi_try!(calc_array_factor_ffi(
        num_antennas,
        x,
        y,
        num_directions,
        az_rad,
        el_rad,
        boresight_az_rad,
        boresight_el_rad,
        freq_hz,
        image,
    ));
    0
}
