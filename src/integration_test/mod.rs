#![cfg(test)]
// Suppress 'unused' warnings for the testsuite
#![allow(unused)]

mod consensus_test;
