mod helpers;

mod correctness;
