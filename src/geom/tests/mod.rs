mod test_primitives_basic;
mod test_vessel_basic;
