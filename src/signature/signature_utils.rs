/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::internal_common::*;

///return the key image points (`h_point(P_i)`) for every member of a ring
pub(crate) fn get_key_image_points(ring: &Ring) -> Vec<Point> {
    return ring.iter()
        .map(|key| h_point(key)).collect();
}

///Next challenge in the ring: `h_scalar(msg || L || R)`
pub(crate) fn challenge(msg: &[u8], left: Point, right: Point) -> Scalar {
    let encoded = batch_encode_points(&[left, right]);
    return h_scalar(&[msg, &encoded[0], &encoded[1]].concat())
}

///Given a private key, return its key image
pub fn get_key_image(private_key: &Scalar) -> KeyImage {
    let public_key = *G * private_key;
    return h_point(&public_key) * private_key
}
